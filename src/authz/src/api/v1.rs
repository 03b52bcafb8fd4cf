//! v1 token catalog document
//!
//! ```yaml
//! version: v1
//! tokens:
//!   - value: ${TOKEN_VALUE}
//!     client_id: my-client
//!     disable: false
//!     expires_at: 2030-01-01T00:00:00Z
//!     allowed_url: https://my.host.dev/.*
//!     allowed_method: (GET|POST)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Only accepted value of [`Config::version`]
pub const VERSION: &str = "v1";

/// Root of a v1 token catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Document version, must be [`VERSION`]
    #[serde(default)]
    pub version: String,

    /// Declared tokens
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// A declared token and its usage constraints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Secret token value
    #[serde(default)]
    pub value: String,

    /// Client the token belongs to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,

    /// Marks the token as inert
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disable: bool,

    /// RFC3339 expiry instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Regex the request URL must match
    #[serde(default, rename = "allowed_url", skip_serializing_if = "String::is_empty")]
    pub allowed_url_regex: String,

    /// Regex the request method must match
    #[serde(default, rename = "allowed_method", skip_serializing_if = "String::is_empty")]
    pub allowed_method_regex: String,
}

impl Token {
    /// Create an unconstrained token declaration
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}
