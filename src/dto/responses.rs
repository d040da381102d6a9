use crate::dto::PaginationParams;
use crate::errors::ApiError;
use crate::models::{Comment, Follow, PostRecord, User};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

fn username(store: &Store, id: Uuid) -> Result<String, ApiError> {
    store
        .username_of(id)
        .ok_or_else(|| ApiError::InternalError(format!("dangling user reference {id}")))
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub author: String,
    pub post: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl CommentResponse {
    pub fn build(comment: Comment, store: &Store) -> Result<Self, ApiError> {
        Ok(Self {
            id: comment.id,
            author: username(store, comment.author)?,
            post: comment.post,
            text: comment.text,
            created: comment.created,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub image: Option<String>,
    pub group: Option<i64>,
    pub comments: Vec<CommentResponse>,
}

impl PostResponse {
    pub fn build(record: PostRecord, store: &Store) -> Result<Self, ApiError> {
        let PostRecord { post, mut comments } = record;
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        let comments = comments
            .into_iter()
            .map(|c| CommentResponse::build(c, store))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: username(store, post.author)?,
            image: post.image,
            group: post.group,
            comments,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub user: String,
    pub following: String,
}

impl FollowResponse {
    pub fn build(follow: &Follow, store: &Store) -> Result<Self, ApiError> {
        Ok(Self {
            user: username(store, follow.user)?,
            following: username(store, follow.following)?,
        })
    }
}

/// Limit/offset page wrapper
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A list endpoint returns a bare array unless the client asked for a page.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paged(Page<T>),
}

impl<T> Listing<T> {
    pub fn paginate(items: Vec<T>, params: &PaginationParams, path: &str) -> Self {
        let Some(limit) = params.limit.filter(|l| *l > 0) else {
            return Listing::Plain(items);
        };
        let offset = params.offset.unwrap_or(0);
        let count = items.len();

        let link = |offset: usize| format!("{path}?limit={limit}&offset={offset}");
        let next_offset = offset.saturating_add(limit);
        let next = (next_offset < count).then(|| link(next_offset));
        let previous = (offset > 0).then(|| link(offset.saturating_sub(limit)));
        let results = items.into_iter().skip(offset).take(limit).collect();

        Listing::Paged(Page {
            count,
            next,
            previous,
            results,
        })
    }
}
