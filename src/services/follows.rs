use super::REQUIRED;
use crate::dto::{FollowPayload, FollowQuery, FollowResponse};
use crate::errors::{ApiError, FieldErrors};
use crate::models::Identity;
use crate::policy::{self, ReadRules, ResourceKind};
use crate::store::{Store, StoreError};
use tracing::info;
use validator::Validate;

const SELF_FOLLOW: &str = "cannot follow self";
const ALREADY_FOLLOWING: &str = "already following";

/// Follow edges of the caller. Listing and creation both require an
/// authenticated identity; there is no unfollow.
pub struct FollowService<'a> {
    store: &'a Store,
    rules: ReadRules,
}

impl<'a> FollowService<'a> {
    pub fn new(store: &'a Store, rules: ReadRules) -> Self {
        Self { store, rules }
    }

    pub fn list(
        &self,
        identity: Option<&Identity>,
        query: &FollowQuery,
    ) -> Result<Vec<FollowResponse>, ApiError> {
        self.rules.authorize_read(identity, ResourceKind::Follow)?;
        let identity = policy::require_identity(identity)?;

        let terms: Vec<String> = query
            .search
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut out = Vec::new();
        for follow in self.store.follows_of(identity.user_id) {
            let edge = FollowResponse::build(&follow, self.store)?;
            let (user, following) = (edge.user.to_lowercase(), edge.following.to_lowercase());
            let matches = terms
                .iter()
                .all(|term| user.contains(term.as_str()) || following.contains(term.as_str()));
            if matches {
                out.push(edge);
            }
        }
        Ok(out)
    }

    pub fn create(
        &self,
        identity: Option<&Identity>,
        payload: FollowPayload,
    ) -> Result<FollowResponse, ApiError> {
        let identity = policy::require_identity(identity)?;
        if let Err(e) = payload.validate() {
            return Err(ApiError::ValidationError(FieldErrors::from(e)));
        }
        let username = payload
            .following
            .ok_or_else(|| ApiError::field("following", REQUIRED))?;

        let target = self
            .store
            .user_by_username(&username)
            .ok_or(ApiError::NotFound)?;
        if target.id == identity.user_id {
            return Err(ApiError::field("following", SELF_FOLLOW));
        }

        let follow = self
            .store
            .insert_follow(identity.user_id, target.id)
            .map_err(|e| match e {
                StoreError::Unique(_) => ApiError::field(FieldErrors::NON_FIELD, ALREADY_FOLLOWING),
                StoreError::Check(_) => ApiError::field("following", SELF_FOLLOW),
                StoreError::ForeignKey(_) => ApiError::NotFound,
            })?;

        info!("{} now follows {}", identity.username, target.username);
        FollowResponse::build(&follow, self.store)
    }
}
