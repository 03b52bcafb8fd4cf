//! In-memory token store

use super::mapper::{self, TokenIndex};
use super::TokenStore;
use crate::error::{AuthzError, ConfigError, Result};
use crate::types::StaticToken;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Immutable token store built once from a catalog document
///
/// Lookups never mutate the index, so the store is shared between request
/// handlers without locking.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: TokenIndex,
}

impl MemoryTokenStore {
    /// Build a store from a raw v1 catalog document (JSON or YAML)
    pub fn new(config: &str) -> Result<Self> {
        let tokens = mapper::map_v1_to_model(config)?;

        info!(svc = "memory.TokenStore", tokens = tokens.len(), "Token validations loaded");

        Ok(Self { tokens })
    }

    /// Build a store from a catalog document on disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::new(&data)
    }

    /// Build a store from already typed records
    pub fn from_tokens(
        tokens: impl IntoIterator<Item = StaticToken>,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            tokens: mapper::index_tokens(tokens)?,
        })
    }

    /// Number of stored tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the store holds no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self, value: &str) -> Result<Arc<StaticToken>> {
        self.tokens.get(value).cloned().ok_or(AuthzError::NotFound)
    }
}
