//! Token review and HTTP metrics recording

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;

const NAMESPACE: &str = "ingress_authz";

/// Sink for per-review outcome facts
///
/// Passed explicitly to the engine and the HTTP layer.
pub trait MetricsRecorder: Send + Sync {
    /// Record a completed token review
    ///
    /// `success` is false when the review ended in an error, independently
    /// of the `valid` verdict.
    fn token_review(&self, success: bool, valid: bool, client_id: &str, invalid_reason: &str);

    /// Record a served HTTP request
    fn http_request(&self, _handler: &str, _method: &str, _status: u16, _duration: Duration) {}
}

/// Recorder that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl MetricsRecorder for NoopRecorder {
    fn token_review(&self, _success: bool, _valid: bool, _client_id: &str, _invalid_reason: &str) {}
}

/// Prometheus-backed recorder
#[derive(Clone)]
pub struct PrometheusRecorder {
    /// Token reviews by outcome
    token_reviews: IntCounterVec,

    /// HTTP request latency
    http_request_duration: HistogramVec,
}

impl PrometheusRecorder {
    /// Create the recorder and register its collectors on `registry`
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let token_reviews = IntCounterVec::new(
            Opts::new("reviews_total", "The number of token reviews.")
                .namespace(NAMESPACE)
                .subsystem("token"),
            &["success", "valid", "client_id", "invalid_reason"],
        )?;
        registry.register(Box::new(token_reviews.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "The latency of the HTTP requests.",
            )
            .namespace(NAMESPACE),
            &["handler", "method", "code"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            token_reviews,
            http_request_duration,
        })
    }
}

impl MetricsRecorder for PrometheusRecorder {
    fn token_review(&self, success: bool, valid: bool, client_id: &str, invalid_reason: &str) {
        self.token_reviews
            .with_label_values(&[
                bool_label(success),
                bool_label(valid),
                client_id,
                invalid_reason,
            ])
            .inc();
    }

    fn http_request(&self, handler: &str, method: &str, status: u16, duration: Duration) {
        self.http_request_duration
            .with_label_values(&[handler, method, &status.to_string()])
            .observe(duration.as_secs_f64());
    }
}

fn bool_label(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}
