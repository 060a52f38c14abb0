//! Session configuration loaded from JSON or the environment.
//!
//! ```rust,ignore
//! use rulekit_validate::prelude::*;
//!
//! let config = ValidatorConfig::from_json(r#"{
//!     "batch": true,
//!     "locale": "zh_CN",
//!     "messages": {"email.email": "邮箱格式不正确"},
//!     "attributes": {"email": "邮箱"}
//! }"#)?;
//! let validator = Validator::from_config(rules, config);
//! ```
//!
//! With the `config` feature, `batch` and `locale` can also come from
//! `RULEKIT_BATCH` / `RULEKIT_LOCALE`, after loading a `.env` file.

use crate::messages::Locale;
use crate::scene::Scene;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be deserialized.
    #[error("Configuration error: {0}")]
    Json(#[from] serde_json::Error),
    /// Environment variable deserialization failed.
    #[cfg(feature = "config")]
    #[error("Configuration error: {0}")]
    Env(#[from] envy::Error),
    #[error("Configuration error: {0}")]
    Locale(String),
}

/// Settings a [`Validator`](crate::Validator) picks up at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Collect every failing field instead of stopping at the first
    pub batch: bool,
    pub locale: Locale,
    /// Message overrides keyed `field.rule`, `field` or `rule`
    pub messages: IndexMap<String, String>,
    /// Field display names
    pub attributes: IndexMap<String, String>,
    /// Named scenes
    pub scenes: IndexMap<String, Scene>,
}

impl ValidatorConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read `RULEKIT_BATCH` and `RULEKIT_LOCALE`, after loading `.env` if
    /// present. Unset variables keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_env_prefixed("RULEKIT")
    }

    /// Like [`ValidatorConfig::from_env`] with a custom prefix and without
    /// touching `.env`.
    #[cfg(feature = "config")]
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct EnvSettings {
            #[serde(default)]
            batch: Option<bool>,
            #[serde(default)]
            locale: Option<String>,
        }

        let env: EnvSettings = envy::prefixed(format!("{}_", prefix)).from_env()?;
        let mut config = Self::default();
        if let Some(batch) = env.batch {
            config.batch = batch;
        }
        if let Some(locale) = env.locale {
            config.locale = locale.parse().map_err(ConfigError::Locale)?;
        }
        tracing::debug!(batch = config.batch, locale = %config.locale, "loaded validator config from env");
        Ok(config)
    }
}
