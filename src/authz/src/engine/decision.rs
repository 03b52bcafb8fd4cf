//! Token review requests and authorization decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A presented credential plus the attributes of the request it guards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReview {
    /// Raw token presented by the client
    pub token: String,

    /// Method of the original request
    #[serde(default)]
    pub http_method: String,

    /// URL of the original request
    #[serde(default)]
    pub http_url: String,
}

impl TokenReview {
    /// Create a review for a token with no request attributes
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Set the original request method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.http_method = method.into();
        self
    }

    /// Set the original request URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.http_url = url.into();
        self
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    /// Unknown token, or token does not match the record
    InvalidToken,
    /// Token is disabled
    DisabledToken,
    /// Token is past its expiry
    ExpiredToken,
    /// Request method not allowed for the token
    InvalidMethod,
    /// Request URL not allowed for the token
    InvalidUrl,
}

impl Reason {
    /// Stable string code, used for metric labels and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::InvalidToken => "invalid-token",
            Reason::DisabledToken => "disabled-token",
            Reason::ExpiredToken => "expired-token",
            Reason::InvalidMethod => "invalid-method",
            Reason::InvalidUrl => "invalid-url",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a token review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDecision {
    /// Whether the request is authorized
    pub authorized: bool,

    /// Client the token belongs to; empty for unknown tokens
    pub client_id: String,

    /// Rejection reason, absent when authorized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl AuthDecision {
    /// Authorized decision for a client
    pub fn allow(client_id: impl Into<String>) -> Self {
        Self {
            authorized: true,
            client_id: client_id.into(),
            reason: None,
        }
    }

    /// Rejection with no client attribution
    pub fn deny(reason: Reason) -> Self {
        Self::deny_for_client(String::new(), reason)
    }

    /// Rejection attributed to a known client
    pub fn deny_for_client(client_id: impl Into<String>, reason: Reason) -> Self {
        Self {
            authorized: false,
            client_id: client_id.into(),
            reason: Some(reason),
        }
    }

    /// Reason code, empty when authorized
    pub fn reason_str(&self) -> &'static str {
        self.reason.map(|r| r.as_str()).unwrap_or("")
    }
}
