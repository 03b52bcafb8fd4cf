//! Ordered token validation rules
//!
//! Each [`Rule`] is a pure predicate over a review and a stored token. An
//! [`AuthenticatorChain`] runs its rules in order and stops at the first
//! rejection, so when several constraints fail the earliest rule's reason
//! is reported.

use super::decision::{Reason, TokenReview};
use crate::types::StaticToken;
use chrono::{DateTime, Utc};

/// Result of evaluating one rule or a whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewResult {
    /// All evaluated rules passed
    Valid,
    /// A rule rejected the token
    Invalid(Reason),
}

impl ReviewResult {
    /// Whether the review passed
    pub fn is_valid(&self) -> bool {
        matches!(self, ReviewResult::Valid)
    }
}

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Presented token equals the record's value
    TokenMatch,
    /// Record is not disabled
    NotDisabled,
    /// Record has no expiry, or `now` is strictly before it
    NotExpired,
    /// Request method matches the record's method pattern, if any
    ValidMethod,
    /// Request URL matches the record's URL pattern, if any
    ValidUrl,
}

impl Rule {
    /// Rules in evaluation order
    pub const ORDER: [Rule; 5] = [
        Rule::TokenMatch,
        Rule::NotDisabled,
        Rule::NotExpired,
        Rule::ValidMethod,
        Rule::ValidUrl,
    ];

    /// Evaluate the rule at instant `now`
    pub fn evaluate(&self, review: &TokenReview, token: &StaticToken, now: DateTime<Utc>) -> ReviewResult {
        let (passed, reason) = match self {
            Rule::TokenMatch => (review.token == token.value, Reason::InvalidToken),
            Rule::NotDisabled => (!token.disabled, Reason::DisabledToken),
            Rule::NotExpired => (
                token.expires_at.map_or(true, |expires_at| now < expires_at),
                Reason::ExpiredToken,
            ),
            // Unanchored search, a pattern matching any substring passes.
            Rule::ValidMethod => (
                token
                    .allowed_method
                    .as_ref()
                    .map_or(true, |re| re.is_match(&review.http_method)),
                Reason::InvalidMethod,
            ),
            Rule::ValidUrl => (
                token
                    .allowed_url
                    .as_ref()
                    .map_or(true, |re| re.is_match(&review.http_url)),
                Reason::InvalidUrl,
            ),
        };

        if passed {
            ReviewResult::Valid
        } else {
            ReviewResult::Invalid(reason)
        }
    }
}

/// Short-circuiting sequence of rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorChain {
    rules: Vec<Rule>,
}

impl AuthenticatorChain {
    /// Chain running `rules` in the given order
    pub fn new(rules: impl Into<Vec<Rule>>) -> Self {
        Self { rules: rules.into() }
    }

    /// Rules of this chain, in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate against the current time
    pub fn evaluate(&self, review: &TokenReview, token: &StaticToken) -> ReviewResult {
        self.evaluate_at(review, token, Utc::now())
    }

    /// Evaluate at a fixed instant
    pub fn evaluate_at(&self, review: &TokenReview, token: &StaticToken, now: DateTime<Utc>) -> ReviewResult {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(review, token, now))
            .find(|result| !result.is_valid())
            .unwrap_or(ReviewResult::Valid)
    }
}

impl Default for AuthenticatorChain {
    fn default() -> Self {
        Self::new(Rule::ORDER)
    }
}
