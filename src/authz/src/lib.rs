//! # Ingress Authz
//!
//! Static token validation engine for reverse-proxy forward authentication.
//!
//! ## Features
//!
//! - **Immutable token store** loaded once from a JSON or YAML catalog, with
//!   environment variable expansion
//! - **Ordered rule chain** (token match, disabled, expiry, method, URL)
//!   stopping at the first rejection
//! - **Prometheus metrics** for every token review
//! - **axum transport** for `auth_request`-style checks
//!
//! ## Example
//!
//! ```rust
//! use ingress_authz::{AuthzEngine, MemoryTokenStore, NoopRecorder, TokenReview};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryTokenStore::new(
//!         r#"{"version": "v1", "tokens": [{"value": "t0", "client_id": "c0", "allowed_method": "GET"}]}"#,
//!     )?;
//!     let engine = AuthzEngine::new(Arc::new(store), Arc::new(NoopRecorder));
//!
//!     let decision = engine.authenticate(&TokenReview::new("t0").with_method("GET"))?;
//!
//!     if decision.authorized {
//!         println!("Access granted to {}", decision.client_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use engine::{
    AuthDecision, AuthenticatorChain, AuthzEngine, MetricsRecorder, NoopRecorder,
    PrometheusRecorder, Reason, ReviewResult, Rule, TokenReview,
};
pub use error::{AuthzError, ConfigError, Result};
pub use store::{MemoryTokenStore, TokenStore};
pub use types::StaticToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
