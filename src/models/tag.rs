use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::encode_path_segment;

pub const TAG_TITLE_MAX_LENGTH: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub title: String,
}

impl Tag {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: Self::normalize_title(title),
        }
    }

    /// Tag titles are stored lowercase; every write and lookup goes through here.
    pub fn normalize_title(title: &str) -> String {
        title.trim().to_lowercase()
    }

    pub fn absolute_url(&self) -> String {
        format!("/tag/{}", encode_path_segment(&self.title))
    }
}
