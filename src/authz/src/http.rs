//! HTTP transport for forward-auth checks
//!
//! ## Endpoints
//!
//! - `<authentication path>` (any method) - token review, reading
//!   `Authorization`, `X-Original-Method` and `X-Original-URL`
//! - `<metrics path>` - Prometheus metrics (internal router)
//! - `<health check path>` - health check (internal router)

use crate::engine::{AuthzEngine, MetricsRecorder, TokenReview};
use crate::error::AuthzError;
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

const ORIGINAL_URL: &str = "x-original-url";
const ORIGINAL_METHOD: &str = "x-original-method";
const AUTHORIZATION_BEARER: &str = "Bearer";

/// Shared state of the authentication router
#[derive(Clone)]
struct AuthState {
    engine: Arc<AuthzEngine>,
    client_id_header: HeaderName,
}

/// Authentication handler error
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized,
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("error mapping request: {msg}"),
            )
                .into_response(),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid token").into_response(),
            AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "error authenticating").into_response()
            }
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the authentication router
///
/// Every request is measured through `metrics`; authorized responses carry
/// the client id in `client_id_header`.
pub fn auth_router(
    path: &str,
    engine: Arc<AuthzEngine>,
    client_id_header: HeaderName,
    metrics: Arc<dyn MetricsRecorder>,
) -> Router {
    let state = AuthState {
        engine,
        client_id_header,
    };

    Router::new()
        .route(path, any(authenticate))
        .route_layer(middleware::from_fn_with_state(metrics, measure))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the internal router serving metrics and health check
pub fn internal_router(metrics_path: &str, health_check_path: &str, registry: Registry) -> Router {
    Router::new()
        .route(metrics_path, get(metrics))
        .route(health_check_path, get(health_check))
        .with_state(registry)
}

/// Map forward-auth headers to a token review
///
/// The first `Bearer` marker is removed from `Authorization` and the rest
/// trimmed.
pub fn review_from_headers(headers: &HeaderMap) -> Result<TokenReview, AuthzError> {
    let token = header_str(headers, header::AUTHORIZATION.as_str())
        .replacen(AUTHORIZATION_BEARER, "", 1)
        .trim()
        .to_string();

    if token.is_empty() {
        return Err(AuthzError::MissingToken);
    }

    Ok(TokenReview::new(token)
        .with_method(header_str(headers, ORIGINAL_METHOD))
        .with_url(header_str(headers, ORIGINAL_URL)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn authenticate(State(state): State<AuthState>, headers: HeaderMap) -> Result<Response, AppError> {
    let review = review_from_headers(&headers).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let decision = state.engine.authenticate(&review).map_err(|e| {
        error!(error = %e, "auth app error");
        AppError::Internal
    })?;

    if !decision.authorized {
        return Err(AppError::Unauthorized);
    }

    let mut response = StatusCode::OK.into_response();
    if !decision.client_id.is_empty() {
        match HeaderValue::from_str(&decision.client_id) {
            Ok(value) => {
                response.headers_mut().insert(state.client_id_header.clone(), value);
            }
            Err(e) => warn!(client = %decision.client_id, error = %e, "Client id is not a valid header value"),
        }
    }

    Ok(response)
}

async fn measure(State(metrics): State<Arc<dyn MetricsRecorder>>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let handler = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    metrics.http_request(&handler, &method, response.status().as_u16(), start.elapsed());

    response
}

async fn metrics(State(registry): State<Registry>) -> Response {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        error!(error = %e, "could not encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], buffer).into_response()
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
