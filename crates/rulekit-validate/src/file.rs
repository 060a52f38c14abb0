//! Uploaded file handles and image header sniffing for the file rules.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Bytes read from the head of a file when sniffing an image. Large enough
/// to reach the frame header of JPEGs carrying EXIF blocks.
const SNIFF_LIMIT: u64 = 256 * 1024;

/// A file received with a request, stored on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    path: PathBuf,
    client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime: Option<String>,
    size: u64,
}

impl UploadedFile {
    /// Describe an upload without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>, client_name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            client_name: client_name.into(),
            mime: None,
            size,
        }
    }

    /// Describe a file already on disk; size comes from its metadata and
    /// the client name from its file name.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let size = path.metadata()?.len();
        let client_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(path, client_name, size))
    }

    /// Attach the MIME type declared by the client.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercased extension of the client file name, or of the stored path
    /// when the client name has none.
    pub fn extension(&self) -> String {
        Path::new(&self.client_name)
            .extension()
            .or_else(|| self.path.extension())
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Declared MIME type, falling back to a guess from the file name.
    pub fn mime_type(&self) -> String {
        match &self.mime {
            Some(mime) => mime.to_ascii_lowercase(),
            None => mime_guess::from_path(&self.client_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    /// Read the file header and recognise GIF, JPEG, PNG and BMP images.
    pub fn image_info(&self) -> Option<ImageInfo> {
        let mut head = Vec::new();
        let file = File::open(&self.path).ok()?;
        file.take(SNIFF_LIMIT).read_to_end(&mut head).ok()?;
        sniff_image(&head)
    }
}

/// Image formats recognised by the `image` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Gif,
    Jpeg,
    Png,
    Bmp,
}

impl ImageKind {
    /// Canonical extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Gif => "gif",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Bmp => "bmp",
        }
    }

    /// Whether a user-supplied type name refers to this format.
    pub fn matches(self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        match self {
            ImageKind::Jpeg => name == "jpeg" || name == "jpg",
            other => name == other.extension(),
        }
    }
}

/// Format and pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub kind: ImageKind,
    /// `(width, height)` when the header carries them.
    pub dimensions: Option<(u32, u32)>,
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

fn le_u16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_le_bytes([b[0], b[1]])))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_i32(bytes: &[u8], at: usize) -> Option<i32> {
    let b = bytes.get(at..at + 4)?;
    Some(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn sniff_image(head: &[u8]) -> Option<ImageInfo> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if head.starts_with(PNG) {
        let dimensions = be_u32(head, 16).zip(be_u32(head, 20));
        return Some(ImageInfo {
            kind: ImageKind::Png,
            dimensions,
        });
    }
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        let dimensions = le_u16(head, 6).zip(le_u16(head, 8));
        return Some(ImageInfo {
            kind: ImageKind::Gif,
            dimensions,
        });
    }
    if head.starts_with(b"BM") && head.len() >= 26 {
        let dimensions = le_i32(head, 18)
            .zip(le_i32(head, 22))
            .map(|(w, h)| (w.unsigned_abs(), h.unsigned_abs()));
        return Some(ImageInfo {
            kind: ImageKind::Bmp,
            dimensions,
        });
    }
    if head.starts_with(&[0xFF, 0xD8]) {
        return Some(ImageInfo {
            kind: ImageKind::Jpeg,
            dimensions: jpeg_dimensions(head),
        });
    }
    None
}

/// Walk JPEG segments until a start-of-frame marker.
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let mut at = 2;
    while at + 4 <= bytes.len() {
        if bytes[at] != 0xFF {
            return None;
        }
        let marker = bytes[at + 1];
        if marker == 0xFF {
            at += 1;
            continue;
        }
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = be_u16(bytes, at + 5)?;
            let width = be_u16(bytes, at + 7)?;
            return Some((width, height));
        }
        let len = be_u16(bytes, at + 2)? as usize;
        at += 2 + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    #[test]
    fn sniffs_png_dimensions() {
        let info = sniff_image(&png_header(640, 480)).unwrap();
        assert_eq!(info.kind, ImageKind::Png);
        assert_eq!(info.dimensions, Some((640, 480)));
    }

    #[test]
    fn sniffs_gif_dimensions() {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&[0x20, 0x00, 0x10, 0x00]);
        let info = sniff_image(&bytes).unwrap();
        assert_eq!(info.kind, ImageKind::Gif);
        assert_eq!(info.dimensions, Some((32, 16)));
    }

    #[test]
    fn sniffs_jpeg_frame_header() {
        let bytes = [
            0xFF, 0xD8, // SOI
            0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, // APP0, length 4
            0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64, 0x00, 0xC8, // SOF0 100x200
        ];
        let info = sniff_image(&bytes).unwrap();
        assert_eq!(info.kind, ImageKind::Jpeg);
        assert_eq!(info.dimensions, Some((200, 100)));
        assert!(info.kind.matches("jpg"));
    }

    #[test]
    fn rejects_text() {
        assert!(sniff_image(b"hello world").is_none());
    }

    #[test]
    fn file_metadata() {
        let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        tmp.write_all(&png_header(2, 3)).unwrap();

        let file = UploadedFile::from_path(tmp.path()).unwrap();
        assert_eq!(file.extension(), "png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), png_header(2, 3).len() as u64);
        assert_eq!(file.image_info().unwrap().dimensions, Some((2, 3)));

        let declared = file.with_mime("Image/GIF");
        assert_eq!(declared.mime_type(), "image/gif");
    }
}
