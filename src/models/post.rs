use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::encode_path_segment;

pub const POST_TITLE_MAX_LENGTH: usize = 200;
pub const SLUG_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub image: Option<String>,
    pub published_at: String,
}

impl Post {
    pub fn new(author_id: String, title: String, text: String, slug: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author_id,
            title,
            text,
            slug,
            image: None,
            published_at: format_timestamp(Utc::now()),
        }
    }

    pub fn absolute_url(&self) -> String {
        format!("/post/{}", encode_path_segment(&self.slug))
    }

    /// Slugs are non-empty runs of ASCII letters, digits, `-` and `_`.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug.chars().count() <= SLUG_MAX_LENGTH
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

/// Timestamps are stored as second-precision RFC 3339 in UTC so that text
/// ordering matches chronological ordering.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
