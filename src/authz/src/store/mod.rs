//! Credential storage
//!
//! A [`TokenStore`] resolves a presented token value to its [`StaticToken`]
//! record. Stores are read-only once built and shared across request
//! handlers behind an `Arc`.

use crate::error::Result;
use crate::types::StaticToken;
use std::sync::Arc;

pub mod mapper;
pub mod memory;

pub use memory::MemoryTokenStore;

/// Token lookup seam used by the engine
pub trait TokenStore: Send + Sync {
    /// Resolve a token value
    ///
    /// Returns [`AuthzError::NotFound`](crate::error::AuthzError::NotFound)
    /// when the value is unknown; any other error is a store failure.
    fn get_token(&self, value: &str) -> Result<Arc<StaticToken>>;
}
