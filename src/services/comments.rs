use super::REQUIRED;
use crate::dto::{CommentPayload, CommentResponse};
use crate::errors::{ApiError, FieldErrors};
use crate::models::Identity;
use crate::policy::{self, Resource, WritePolicy};
use crate::store::Store;
use tracing::info;
use validator::Validate;

/// Comments are always addressed through their parent post. The parent is
/// resolved first; a missing parent, or a comment that lives under a
/// different post, is `NotFound`.
pub struct CommentService<'a> {
    store: &'a Store,
    policy: &'a dyn WritePolicy,
}

impl<'a> CommentService<'a> {
    pub fn new(store: &'a Store, policy: &'a dyn WritePolicy) -> Self {
        Self { store, policy }
    }

    /// `NotFound` unless the post exists.
    pub fn parent(&self, post_id: i64) -> Result<(), ApiError> {
        if self.store.post_exists(post_id) {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }

    pub fn list(&self, post_id: i64) -> Result<Vec<CommentResponse>, ApiError> {
        self.store
            .comments(post_id)
            .ok_or(ApiError::NotFound)?
            .into_iter()
            .map(|c| CommentResponse::build(c, self.store))
            .collect()
    }

    pub fn retrieve(&self, post_id: i64, id: i64) -> Result<CommentResponse, ApiError> {
        self.parent(post_id)?;
        let comment = self.store.comment(post_id, id).ok_or(ApiError::NotFound)?;
        CommentResponse::build(comment, self.store)
    }

    pub fn create(
        &self,
        identity: Option<&Identity>,
        post_id: i64,
        payload: CommentPayload,
    ) -> Result<CommentResponse, ApiError> {
        let identity = policy::require_identity(identity)?;
        self.parent(post_id)?;
        let text = validate(payload, true)?
            .text
            .ok_or_else(|| ApiError::field("text", REQUIRED))?;

        // The post may vanish between the parent check and the insert.
        let comment = self
            .store
            .insert_comment(post_id, identity.user_id, text)
            .ok_or(ApiError::NotFound)?;

        info!(
            "Comment created: {} on post {} by user {}",
            comment.id, post_id, identity.username
        );
        CommentResponse::build(comment, self.store)
    }

    pub fn writable(&self, identity: Option<&Identity>, post_id: i64, id: i64) -> Result<(), ApiError> {
        policy::require_identity(identity)?;
        self.parent(post_id)?;
        let comment = self.store.comment(post_id, id).ok_or(ApiError::NotFound)?;
        policy::authorize_write(self.policy, identity, Resource::Comment(&comment))
    }

    pub fn update(
        &self,
        identity: Option<&Identity>,
        post_id: i64,
        id: i64,
        payload: CommentPayload,
        partial: bool,
    ) -> Result<CommentResponse, ApiError> {
        policy::require_identity(identity)?;
        self.parent(post_id)?;
        let validated = validate(payload, !partial);

        let comment = self
            .store
            .update_comment(post_id, id, |comment| {
                policy::authorize_write(self.policy, identity, Resource::Comment(comment))?;
                if let Some(text) = validated?.text {
                    comment.text = text;
                }
                Ok::<_, ApiError>(comment.clone())
            })
            .ok_or(ApiError::NotFound)??;

        info!("Comment updated: {} on post {}", id, post_id);
        CommentResponse::build(comment, self.store)
    }

    pub fn delete(&self, identity: Option<&Identity>, post_id: i64, id: i64) -> Result<(), ApiError> {
        policy::require_identity(identity)?;
        self.parent(post_id)?;
        self.store
            .delete_comment(post_id, id, |comment| {
                policy::authorize_write(self.policy, identity, Resource::Comment(comment))
            })
            .ok_or(ApiError::NotFound)??;

        info!("Comment deleted: {} on post {}", id, post_id);
        Ok(())
    }
}

fn validate(payload: CommentPayload, require_text: bool) -> Result<CommentPayload, ApiError> {
    let mut errors = match payload.validate() {
        Ok(()) => FieldErrors::default(),
        Err(e) => e.into(),
    };
    if require_text && payload.text.is_none() {
        errors.add("text", REQUIRED);
    }
    errors.into_result().map(|()| payload)
}
