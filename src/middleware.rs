//! Cross-cutting layers: CORS, request tracing, concurrency cap and the
//! write-rate limiter.

use crate::auth::validate_token;
use crate::errors::ApiError;
use crate::states::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{HttpMakeClassifier, TraceLayer},
};

pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
}

pub fn concurrency_limit(max: usize) -> ConcurrencyLimitLayer {
    ConcurrencyLimitLayer::new(max.max(1))
}

/// Rejects unsafe methods with 429 once the caller's write quota is spent.
/// Callers are keyed by token subject; requests without a usable token
/// share one bucket. Reads are never limited.
pub async fn limit_writes(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !request.method().is_safe() {
        if let Some(limiter) = &state.write_limiter {
            let key = validate_token(request.headers(), &state.config.jwt_secret)
                .ok()
                .flatten()
                .map(|claims| claims.sub)
                .unwrap_or_default();
            if limiter.check_key(&key).is_err() {
                tracing::warn!("write rate limit exceeded: {} {}", request.method(), request.uri());
                return Err(ApiError::RateLimited);
            }
        }
    }
    Ok(next.run(request).await)
}
