use super::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: Uuid,
    pub image: Option<String>,
    pub group: Option<i64>,
}

/// A post row together with the comments it owns.
///
/// Comments are stored inside their parent row so that removing the row
/// removes every comment with it.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author: Uuid,
    pub image: Option<String>,
    pub group: Option<i64>,
}
