//! Social-blogging REST API: posts, comments, groups and follows.
//!
//! Request flow is routes → policy → services → store. The caller's
//! identity is resolved from the bearer token in each handler and passed
//! explicitly into every service call.

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod states;
pub mod store;

pub use config::Config;
pub use errors::ApiError;
pub use states::AppState;

use axum::{Router, middleware::from_fn_with_state, routing::get};

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let max_concurrent = state.config.max_concurrent_requests;
    let prefix = state.config.api_prefix.clone();

    Router::new()
        // Public routes (no auth required)
        .route("/health", get(routes::health::health_check))
        .nest(&prefix, routes::api_routes())
        .layer(from_fn_with_state(state.clone(), middleware::limit_writes))
        // Add state and middleware
        .with_state(state)
        .layer(middleware::cors_policy())
        .layer(middleware::trace_layer())
        .layer(middleware::concurrency_limit(max_concurrent))
}
