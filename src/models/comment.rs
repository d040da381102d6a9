use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post: i64,
    pub author: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}
