//! # Rulekit
//!
//! Declarative validation for dynamic request data.
//!
//! Rulekit validates nested, JSON-like data against compact rule strings
//! (`"required|email|max:100"`), with scenes, batch or fail-fast error
//! collection, default injection and wildcard rules for lists.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rulekit::prelude::*;
//! use serde_json::json;
//!
//! let mut validator = Validator::new(RuleMap::from([
//!     ("name|Name", "required|max:25"),
//!     ("email", "required|email"),
//!     ("tags.*", "alphaDash|max:16"),
//! ]))
//! .batch(true);
//!
//! let data = Value::from(json!({"name": "kit", "email": "not-an-email"}));
//! if !validator.check(&data) {
//!     println!("{}", validator.error());
//! }
//! ```
//!
//! ## Request Guard
//!
//! [`RequestGuard`] runs a validator over the query and body of an
//! [`http::Request`] and reports failures as a [`ValidateException`]
//! with status 422.
//!
//! ## Optional Features
//!
//! - `config` - load [`ValidatorConfig`] from `RULEKIT_*` environment
//!   variables and `.env` files

// Re-export the engine
pub use rulekit_validate::*;

pub mod guard;

pub use guard::{parse_form, RequestGuard, UnknownParams};

/// Prelude module - import everything you need with `use rulekit::prelude::*`
pub mod prelude {
    pub use rulekit_validate::prelude::*;

    pub use crate::guard::{RequestGuard, UnknownParams};

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
