//! Error types for the token validation engine

use thiserror::Error;

/// Token catalog load errors
///
/// Any of these aborts store construction; there is no partially loaded
/// catalog.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable expansion failed
    #[error("could not substitute env vars into the configuration: {0}")]
    EnvSubstitution(String),

    /// Document is neither valid JSON nor valid YAML
    #[error("json and yaml unmarshal failed, json: {json:?}, yaml: {yaml:?}")]
    Parse { json: String, yaml: String },

    /// Document version is not supported
    #[error("invalid version, expected {expected}, got {got:?}")]
    UnsupportedVersion { expected: &'static str, got: String },

    /// Token declared with an empty value
    #[error("token value can't be empty (token #{index})")]
    EmptyTokenValue { index: usize },

    /// Same token value declared more than once
    #[error("a token has been declared multiple times (token #{index})")]
    DuplicateToken { index: usize },

    /// Method or URL pattern does not compile
    #[error("could not compile {pattern} regex: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Token validation engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Request carried no token
    #[error("token is missing")]
    MissingToken,

    /// Token is not present in the store
    #[error("token not found")]
    NotFound,

    /// Store failed for a reason other than a missing token
    #[error("Storage error: {0}")]
    Storage(String),

    /// Token catalog could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Whether the error is the store's "unknown token" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthzError::NotFound)
    }
}

/// Result type for token validation operations
pub type Result<T> = std::result::Result<T, AuthzError>;
