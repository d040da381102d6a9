use crate::config::Config;
use crate::errors::ApiError;
use crate::models::Identity;
use crate::policy::{AuthorOrReadOnly, ReadRules, WritePolicy};
use crate::services::{CommentService, FollowService, GroupService, PostService};
use crate::store::Store;
use axum::http::HeaderMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cloned into every handler by axum. Everything mutable lives behind the
/// store; the rest is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub policy: Arc<dyn WritePolicy>,
    pub read_rules: ReadRules,
    pub config: Arc<Config>,
    /// Write quota per caller, keyed by token subject.
    pub write_limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Store::new())
    }

    pub fn with_store(config: Config, store: Store) -> Self {
        let write_limiter = config
            .write_rate_limit_per_second
            .map(|rate| Arc::new(RateLimiter::keyed(Quota::per_second(rate))));
        Self {
            store: Arc::new(store),
            policy: Arc::new(AuthorOrReadOnly),
            read_rules: ReadRules {
                groups_require_auth: config.groups_require_auth,
            },
            config: Arc::new(config),
            write_limiter,
        }
    }

    /// The caller behind this request, `None` when anonymous.
    pub fn identity(&self, headers: &HeaderMap) -> Result<Option<Identity>, ApiError> {
        crate::auth::resolve_identity(headers, &self.config.jwt_secret, &self.store)
    }

    pub fn posts(&self) -> PostService<'_> {
        PostService::new(&self.store, self.policy.as_ref())
    }

    pub fn comments(&self) -> CommentService<'_> {
        CommentService::new(&self.store, self.policy.as_ref())
    }

    pub fn groups(&self) -> GroupService<'_> {
        GroupService::new(&self.store, self.read_rules)
    }

    pub fn follows(&self) -> FollowService<'_> {
        FollowService::new(&self.store, self.read_rules)
    }
}
