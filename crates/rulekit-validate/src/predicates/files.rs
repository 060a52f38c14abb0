//! Uploaded-file rules.

use crate::value::Value;

fn list(param: &str) -> impl Iterator<Item = String> + '_ {
    param
        .split(',')
        .map(|item| item.trim().trim_start_matches('.').to_ascii_lowercase())
}

pub(crate) fn file(value: &Value) -> bool {
    value.as_file().is_some()
}

/// A GIF, JPEG, PNG or BMP; with `width,height[,type]` the header must also
/// report exactly those dimensions and that format.
pub(crate) fn image(value: &Value, param: Option<&str>) -> bool {
    let Some(info) = value.as_file().and_then(|f| f.image_info()) else {
        return false;
    };
    let Some(param) = param else {
        return true;
    };
    let parts: Vec<&str> = param.split(',').map(str::trim).collect();
    let expected = match (parts.first(), parts.get(1)) {
        (Some(w), Some(h)) => (w.parse::<u32>().ok(), h.parse::<u32>().ok()),
        _ => return false,
    };
    let dims_match = match (info.dimensions, expected) {
        (Some((w, h)), (Some(ew), Some(eh))) => w == ew && h == eh,
        _ => false,
    };
    let kind_match = parts.get(2).map_or(true, |kind| info.kind.matches(kind));
    dims_match && kind_match
}

pub(crate) fn file_ext(value: &Value, param: &str) -> bool {
    value.as_file().map_or(false, |f| {
        let ext = f.extension();
        list(param).any(|allowed| allowed == ext)
    })
}

pub(crate) fn file_mime(value: &Value, param: &str) -> bool {
    value.as_file().map_or(false, |f| {
        let mime = f.mime_type();
        list(param).any(|allowed| allowed == mime)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::UploadedFile;
    use std::io::Write;

    fn gif_upload(width: u16, height: u16) -> (tempfile::NamedTempFile, Value) {
        let mut tmp = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        tmp.write_all(&bytes).unwrap();
        let value = Value::File(UploadedFile::from_path(tmp.path()).unwrap());
        (tmp, value)
    }

    #[test]
    fn plain_file() {
        let upload = Value::File(UploadedFile::new("/tmp/report.pdf", "report.pdf", 10));
        assert!(file(&upload));
        assert!(!file(&Value::from("report.pdf")));
    }

    #[test]
    fn image_checks() {
        let (_tmp, gif) = gif_upload(120, 80);
        assert!(image(&gif, None));
        assert!(image(&gif, Some("120,80")));
        assert!(image(&gif, Some("120,80,gif")));
        assert!(!image(&gif, Some("120,80,png")));
        assert!(!image(&gif, Some("100,80")));
    }

    #[test]
    fn non_image_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"plain text").unwrap();
        let value = Value::File(UploadedFile::from_path(tmp.path()).unwrap());
        assert!(!image(&value, None));
    }

    #[test]
    fn extension_and_mime_lists() {
        let upload = Value::File(UploadedFile::new("/tmp/x", "Photo.JPG", 10));
        assert!(file_ext(&upload, "png,jpg"));
        assert!(!file_ext(&upload, "png,gif"));
        assert!(file_mime(&upload, "image/jpeg,image/png"));

        let declared = Value::File(
            UploadedFile::new("/tmp/y", "upload.bin", 10).with_mime("application/pdf"),
        );
        assert!(file_mime(&declared, "application/pdf"));
        assert!(!file_ext(&Value::from("a.png"), "png"));
    }
}
