use super::REQUIRED;
use crate::dto::{PostPayload, PostResponse};
use crate::errors::{ApiError, FieldErrors};
use crate::models::{Identity, NewPost};
use crate::policy::{self, Resource, WritePolicy};
use crate::store::{Store, StoreError};
use tracing::info;
use validator::Validate;

pub struct PostService<'a> {
    store: &'a Store,
    policy: &'a dyn WritePolicy,
}

impl<'a> PostService<'a> {
    pub fn new(store: &'a Store, policy: &'a dyn WritePolicy) -> Self {
        Self { store, policy }
    }

    pub fn list(&self) -> Result<Vec<PostResponse>, ApiError> {
        self.store
            .posts()
            .into_iter()
            .map(|record| PostResponse::build(record, self.store))
            .collect()
    }

    pub fn retrieve(&self, id: i64) -> Result<PostResponse, ApiError> {
        let record = self.store.post(id).ok_or(ApiError::NotFound)?;
        PostResponse::build(record, self.store)
    }

    pub fn create(
        &self,
        identity: Option<&Identity>,
        payload: PostPayload,
    ) -> Result<PostResponse, ApiError> {
        let identity = policy::require_identity(identity)?;
        let payload = self.validate(payload, true).map_err(ApiError::ValidationError)?;
        let text = payload.text.ok_or_else(|| ApiError::field("text", REQUIRED))?;

        let record = self
            .store
            .insert_post(NewPost {
                text,
                author: identity.user_id,
                image: payload.image.flatten(),
                group: payload.group.flatten(),
            })
            .map_err(|e| match e {
                StoreError::ForeignKey("group") => unknown_group(payload.group.flatten()),
                other => ApiError::InternalError(other.to_string()),
            })?;

        info!("Post created: {} by user {}", record.post.id, identity.username);
        PostResponse::build(record, self.store)
    }

    /// Lookup and ownership checks of an update, without applying it.
    pub fn writable(&self, identity: Option<&Identity>, id: i64) -> Result<(), ApiError> {
        policy::require_identity(identity)?;
        let record = self.store.post(id).ok_or(ApiError::NotFound)?;
        policy::authorize_write(self.policy, identity, Resource::Post(&record.post))
    }

    /// PUT when `partial` is false (text required), PATCH otherwise.
    pub fn update(
        &self,
        identity: Option<&Identity>,
        id: i64,
        payload: PostPayload,
        partial: bool,
    ) -> Result<PostResponse, ApiError> {
        policy::require_identity(identity)?;
        let validated = self.validate(payload, !partial);

        let record = self
            .store
            .update_post(id, |record| {
                policy::authorize_write(self.policy, identity, Resource::Post(&record.post))?;
                let changes = validated.map_err(ApiError::ValidationError)?;
                if let Some(text) = changes.text {
                    record.post.text = text;
                }
                if let Some(group) = changes.group {
                    record.post.group = group;
                }
                if let Some(image) = changes.image {
                    record.post.image = image;
                }
                Ok::<_, ApiError>(record.clone())
            })
            .ok_or(ApiError::NotFound)??;

        info!("Post updated: {}", id);
        PostResponse::build(record, self.store)
    }

    pub fn delete(&self, identity: Option<&Identity>, id: i64) -> Result<(), ApiError> {
        policy::require_identity(identity)?;
        let removed = self
            .store
            .delete_post(id, |post| {
                policy::authorize_write(self.policy, identity, Resource::Post(post))
            })
            .ok_or(ApiError::NotFound)??;

        info!(
            "Post deleted: {} with {} comments",
            id,
            removed.comments.len()
        );
        Ok(())
    }

    fn validate(&self, payload: PostPayload, require_text: bool) -> Result<PostPayload, FieldErrors> {
        let mut errors = match payload.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => e.into(),
        };
        if require_text && payload.text.is_none() {
            errors.add("text", REQUIRED);
        }
        if let Some(Some(group)) = payload.group {
            if self.store.group(group).is_none() {
                errors.add("group", unknown_group_message(group));
            }
        }
        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(errors)
        }
    }
}

fn unknown_group_message(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

fn unknown_group(id: Option<i64>) -> ApiError {
    match id {
        Some(id) => ApiError::field("group", unknown_group_message(id)),
        None => ApiError::InternalError("group reference rejected without a group".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewGroup;
    use crate::policy::AuthorOrReadOnly;

    fn identity(store: &Store, name: &str) -> Identity {
        let user = store.insert_user(name, None, "x".into()).unwrap();
        Identity::from(&user)
    }

    fn text(t: &str) -> PostPayload {
        PostPayload {
            text: Some(t.into()),
            ..Default::default()
        }
    }

    #[test]
    fn author_comes_from_identity() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let service = PostService::new(&store, &AuthorOrReadOnly);

        let created = service.create(Some(&alice), text("hello")).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.author, "alice");
        assert!(created.comments.is_empty());
    }

    #[test]
    fn anonymous_create_is_unauthorized() {
        let store = Store::new();
        let service = PostService::new(&store, &AuthorOrReadOnly);
        assert!(matches!(
            service.create(None, text("hello")),
            Err(ApiError::Unauthorized)
        ));
        assert!(store.posts().is_empty());
    }

    #[test]
    fn create_requires_text_and_known_group() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let service = PostService::new(&store, &AuthorOrReadOnly);

        let payload = PostPayload {
            group: Some(Some(9)),
            ..Default::default()
        };
        let Err(ApiError::ValidationError(errors)) = service.create(Some(&alice), payload) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("text").unwrap(), [REQUIRED]);
        assert_eq!(
            errors.get("group").unwrap(),
            ["Invalid pk \"9\" - object does not exist."]
        );
    }

    #[test]
    fn group_can_be_set_and_cleared() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let group = store
            .insert_group(NewGroup {
                title: "Cats".into(),
                slug: "cats".into(),
                description: String::new(),
            })
            .unwrap();
        let service = PostService::new(&store, &AuthorOrReadOnly);

        let mut payload = text("hi");
        payload.group = Some(Some(group.id));
        let created = service.create(Some(&alice), payload).unwrap();
        assert_eq!(created.group, Some(group.id));

        let clear = PostPayload {
            group: Some(None),
            ..Default::default()
        };
        let updated = service.update(Some(&alice), created.id, clear, true).unwrap();
        assert_eq!(updated.group, None);
        assert_eq!(updated.text, "hi");
    }

    #[test]
    fn non_owner_cannot_update_or_delete() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let bob = identity(&store, "bob");
        let service = PostService::new(&store, &AuthorOrReadOnly);
        let post = service.create(Some(&alice), text("mine")).unwrap();

        assert!(matches!(
            service.update(Some(&bob), post.id, text("yours"), false),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            service.delete(Some(&bob), post.id),
            Err(ApiError::Forbidden)
        ));
        assert_eq!(service.retrieve(post.id).unwrap().text, "mine");
    }

    #[test]
    fn missing_post_wins_over_bad_payload() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let service = PostService::new(&store, &AuthorOrReadOnly);

        assert!(matches!(
            service.update(Some(&alice), 5, PostPayload::default(), false),
            Err(ApiError::NotFound)
        ));
        assert!(matches!(service.delete(Some(&alice), 5), Err(ApiError::NotFound)));
    }

    #[test]
    fn full_update_requires_text() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let service = PostService::new(&store, &AuthorOrReadOnly);
        let post = service.create(Some(&alice), text("a")).unwrap();

        assert!(matches!(
            service.update(Some(&alice), post.id, PostPayload::default(), false),
            Err(ApiError::ValidationError(_))
        ));
        let patched = service
            .update(Some(&alice), post.id, PostPayload::default(), true)
            .unwrap();
        assert_eq!(patched.text, "a");
    }

    #[test]
    fn delete_cascades_to_comments() {
        let store = Store::new();
        let alice = identity(&store, "alice");
        let service = PostService::new(&store, &AuthorOrReadOnly);
        let post = service.create(Some(&alice), text("a")).unwrap();
        store.insert_comment(post.id, alice.user_id, "c".into()).unwrap();

        service.delete(Some(&alice), post.id).unwrap();
        assert!(store.comments(post.id).is_none());
        assert!(matches!(service.retrieve(post.id), Err(ApiError::NotFound)));
    }
}
