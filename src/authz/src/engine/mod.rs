//! Token validation engine
//!
//! Resolves a presented token through a [`TokenStore`] and runs the
//! resulting record through an [`AuthenticatorChain`].
//!
//! ```text
//! TokenReview → [missing token?] → TokenStore → AuthenticatorChain → AuthDecision
//!                                                                        ↓
//!                                                                    [Metrics]
//! ```

pub mod chain;
pub mod decision;
pub mod metrics;

pub use chain::{AuthenticatorChain, ReviewResult, Rule};
pub use decision::{AuthDecision, Reason, TokenReview};
pub use metrics::{MetricsRecorder, NoopRecorder, PrometheusRecorder};

use crate::error::{AuthzError, Result};
use crate::store::TokenStore;

use std::sync::Arc;
use tracing::{debug, info};

/// Authenticates token reviews against a store
///
/// Holds no mutable state; one instance serves concurrent callers.
pub struct AuthzEngine {
    /// Token lookup backend
    store: Arc<dyn TokenStore>,

    /// Validation rules applied to resolved tokens
    chain: AuthenticatorChain,

    /// Outcome sink
    metrics: Arc<dyn MetricsRecorder>,
}

impl AuthzEngine {
    /// Create an engine with the standard rule order
    pub fn new(store: Arc<dyn TokenStore>, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self::with_chain(store, metrics, AuthenticatorChain::default())
    }

    /// Create an engine with a custom rule chain
    pub fn with_chain(
        store: Arc<dyn TokenStore>,
        metrics: Arc<dyn MetricsRecorder>,
        chain: AuthenticatorChain,
    ) -> Self {
        Self {
            store,
            chain,
            metrics,
        }
    }

    /// Review a token and decide whether the request is authorized
    ///
    /// An unknown token is a normal rejection (`invalid-token`). Errors are
    /// reserved for a missing token ([`AuthzError::MissingToken`]) and store
    /// failures. Every call is reported to the metrics recorder.
    pub fn authenticate(&self, review: &TokenReview) -> Result<AuthDecision> {
        let result = self.review(review);

        match &result {
            Ok(decision) => self.metrics.token_review(
                true,
                decision.authorized,
                &decision.client_id,
                decision.reason_str(),
            ),
            Err(_) => self.metrics.token_review(false, false, "", ""),
        }

        result
    }

    fn review(&self, review: &TokenReview) -> Result<AuthDecision> {
        if review.token.is_empty() {
            return Err(AuthzError::MissingToken);
        }

        let token = match self.store.get_token(&review.token) {
            Ok(token) => token,
            Err(AuthzError::NotFound) => {
                info!(url = %review.http_url, method = %review.http_method, "Unknown token");
                return Ok(AuthDecision::deny(Reason::InvalidToken));
            }
            Err(e) => return Err(e),
        };

        match self.chain.evaluate(review, &token) {
            ReviewResult::Valid => {
                debug!(client = %token.client_id, "Token authorized");
                Ok(AuthDecision::allow(token.client_id.clone()))
            }
            ReviewResult::Invalid(reason) => {
                info!(
                    url = %review.http_url,
                    method = %review.http_method,
                    client = %token.client_id,
                    reason = %reason,
                    "Token unauthorized"
                );
                Ok(AuthDecision::deny_for_client(token.client_id.clone(), reason))
            }
        }
    }
}
