//! Authorization policy.
//!
//! Write checks are pure predicates over `(identity, resource)`. The
//! helpers at the bottom turn a predicate outcome into the right
//! `ApiError`: no identity is `Unauthorized`, a failed predicate is
//! `Forbidden`.

use crate::errors::ApiError;
use crate::models::{Comment, Follow, Identity, Post};

/// A resource a caller may try to mutate.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Post(&'a Post),
    Comment(&'a Comment),
    Follow(&'a Follow),
}

/// Resource families with a read gate. Posts and comments are readable by
/// anyone and have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Group,
    Follow,
}

pub trait WritePolicy: Send + Sync {
    fn can_write_post(&self, identity: &Identity, post: &Post) -> bool;
    fn can_write_comment(&self, identity: &Identity, comment: &Comment) -> bool;
    fn can_write_follow(&self, identity: &Identity, follow: &Follow) -> bool;

    fn can_write(&self, identity: Option<&Identity>, resource: Resource<'_>) -> bool {
        let Some(identity) = identity else {
            return false;
        };
        match resource {
            Resource::Post(post) => self.can_write_post(identity, post),
            Resource::Comment(comment) => self.can_write_comment(identity, comment),
            Resource::Follow(follow) => self.can_write_follow(identity, follow),
        }
    }
}

/// Only the author (or, for follows, the follower) may change a resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorOrReadOnly;

impl WritePolicy for AuthorOrReadOnly {
    fn can_write_post(&self, identity: &Identity, post: &Post) -> bool {
        post.author == identity.user_id
    }

    fn can_write_comment(&self, identity: &Identity, comment: &Comment) -> bool {
        comment.author == identity.user_id
    }

    fn can_write_follow(&self, identity: &Identity, follow: &Follow) -> bool {
        follow.user == identity.user_id
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadRules {
    pub groups_require_auth: bool,
}

impl ReadRules {
    pub fn can_read(&self, identity: Option<&Identity>, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Group => identity.is_some() || !self.groups_require_auth,
            ResourceKind::Follow => identity.is_some(),
        }
    }

    pub fn authorize_read(
        &self,
        identity: Option<&Identity>,
        kind: ResourceKind,
    ) -> Result<(), ApiError> {
        if self.can_read(identity, kind) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Creation gate: any authenticated caller.
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity, ApiError> {
    identity.ok_or(ApiError::Unauthorized)
}

/// Mutation gate for an existing resource.
pub fn authorize_write(
    policy: &dyn WritePolicy,
    identity: Option<&Identity>,
    resource: Resource<'_>,
) -> Result<(), ApiError> {
    require_identity(identity)?;
    if policy.can_write(identity, resource) {
        Ok(())
    } else {
        tracing::debug!(?resource, "write rejected for non-owner");
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn identity(name: &str) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            username: name.to_string(),
        }
    }

    fn post_by(author: &Identity) -> Post {
        Post {
            id: 1,
            text: "t".into(),
            pub_date: Utc::now(),
            author: author.user_id,
            image: None,
            group: None,
        }
    }

    #[test]
    fn author_may_write_own_post() {
        let alice = identity("alice");
        let post = post_by(&alice);
        assert!(AuthorOrReadOnly.can_write(Some(&alice), Resource::Post(&post)));
        assert!(authorize_write(&AuthorOrReadOnly, Some(&alice), Resource::Post(&post)).is_ok());
    }

    #[test]
    fn anonymous_write_is_unauthorized() {
        let alice = identity("alice");
        let post = post_by(&alice);
        assert!(!AuthorOrReadOnly.can_write(None, Resource::Post(&post)));
        assert!(matches!(
            authorize_write(&AuthorOrReadOnly, None, Resource::Post(&post)),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn non_owner_write_is_forbidden() {
        let alice = identity("alice");
        let bob = identity("bob");
        let comment = Comment {
            id: 1,
            post: 1,
            author: alice.user_id,
            text: "c".into(),
            created: Utc::now(),
        };
        assert!(matches!(
            authorize_write(&AuthorOrReadOnly, Some(&bob), Resource::Comment(&comment)),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn follow_is_owned_by_follower() {
        let alice = identity("alice");
        let bob = identity("bob");
        let follow = Follow {
            id: 1,
            user: alice.user_id,
            following: bob.user_id,
            created_at: Utc::now(),
        };
        assert!(AuthorOrReadOnly.can_write_follow(&alice, &follow));
        assert!(!AuthorOrReadOnly.can_write_follow(&bob, &follow));
    }

    #[test]
    fn read_rules() {
        let alice = identity("alice");
        let open = ReadRules::default();
        let strict = ReadRules {
            groups_require_auth: true,
        };

        assert!(open.can_read(None, ResourceKind::Group));
        assert!(!open.can_read(None, ResourceKind::Follow));
        assert!(open.can_read(Some(&alice), ResourceKind::Follow));

        assert!(!strict.can_read(None, ResourceKind::Group));
        assert!(strict.can_read(Some(&alice), ResourceKind::Group));
        assert!(matches!(
            strict.authorize_read(None, ResourceKind::Group),
            Err(ApiError::Unauthorized)
        ));
    }
}
