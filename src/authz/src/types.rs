//! Core credential types

use chrono::{DateTime, Utc};
use regex::Regex;

/// Stored credential: a static token value and its usage constraints
///
/// Every field besides `value` is optional; an absent constraint never
/// rejects a request.
#[derive(Debug, Clone)]
pub struct StaticToken {
    /// Secret token value, unique within a store
    pub value: String,

    /// Client the token belongs to (attribution only)
    pub client_id: String,

    /// Inert token, rejected regardless of other fields
    pub disabled: bool,

    /// Instant after which the token is no longer valid
    pub expires_at: Option<DateTime<Utc>>,

    /// Pattern the request method must match
    pub allowed_method: Option<Regex>,

    /// Pattern the request URL must match
    pub allowed_url: Option<Regex>,
}

impl StaticToken {
    /// Create an unconstrained token
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            client_id: String::new(),
            disabled: false,
            expires_at: None,
            allowed_method: None,
            allowed_url: None,
        }
    }

    /// Attribute the token to a client
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Mark the token as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the expiry instant
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Restrict the allowed HTTP methods
    pub fn with_allowed_method(mut self, pattern: Regex) -> Self {
        self.allowed_method = Some(pattern);
        self
    }

    /// Restrict the allowed URLs
    pub fn with_allowed_url(mut self, pattern: Regex) -> Self {
        self.allowed_url = Some(pattern);
        self
    }
}
