use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::post::format_timestamp;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub published_at: String,
}

impl Comment {
    pub fn new(post_id: String, author_id: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            post_id,
            author_id,
            text,
            published_at: format_timestamp(Utc::now()),
        }
    }
}

/// Comment joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub published_at: String,
    pub author_name: String,
}
