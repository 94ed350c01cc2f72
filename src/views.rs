//! Flat display records handed to templates.
//!
//! Serializers never query the database; counts arrive pre-annotated and
//! default to zero when the caller did not compute them.

use serde::Serialize;

use crate::models::post::parse_timestamp;
use crate::models::{CommentWithAuthor, Tag};
use crate::ranking::{PostSummary, RankedTag};

pub const TEASER_LENGTH: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub title: String,
    pub url: String,
    pub posts_with_tag: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_amount: i64,
    pub image_url: Option<String>,
    pub published_at: String,
    pub published_label: String,
    pub slug: String,
    pub url: String,
    pub tags: Vec<TagView>,
    pub first_tag_title: Option<String>,
    pub first_tag_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub text: String,
    pub published_at: String,
    pub published_label: String,
    pub author: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailView {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentView>,
    pub likes_amount: i64,
    pub image_url: Option<String>,
    pub published_at: String,
    pub published_label: String,
    pub slug: String,
    pub tags: Vec<TagView>,
}

/// First [`TEASER_LENGTH`] characters of `text`.
pub fn teaser(text: &str) -> String {
    text.chars().take(TEASER_LENGTH).collect()
}

/// Public URL of a stored image reference, or `None` when the post has none.
pub fn image_url(media_url: &str, image: Option<&str>) -> Option<String> {
    let image = image.map(str::trim).filter(|i| !i.is_empty())?;
    Some(format!(
        "{}/{}",
        media_url.trim_end_matches('/'),
        image.trim_start_matches('/')
    ))
}

/// Human-readable timestamp; unparseable input is shown as stored.
pub fn published_label(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%d %b %Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

pub fn serialize_tag(tag: &Tag, posts_count: Option<i64>) -> TagView {
    TagView {
        title: tag.title.clone(),
        url: tag.absolute_url(),
        posts_with_tag: posts_count.unwrap_or(0),
    }
}

pub fn serialize_ranked_tag(ranked: &RankedTag) -> TagView {
    serialize_tag(&ranked.tag, Some(ranked.posts_count))
}

pub fn serialize_post(summary: &PostSummary, tags: &[RankedTag], media_url: &str) -> PostView {
    let post = &summary.post;
    PostView {
        title: post.title.clone(),
        teaser_text: teaser(&post.text),
        author: summary.author_name.clone(),
        comments_amount: summary.comments_count.unwrap_or(0),
        image_url: image_url(media_url, post.image.as_deref()),
        published_at: post.published_at.clone(),
        published_label: published_label(&post.published_at),
        slug: post.slug.clone(),
        url: post.absolute_url(),
        tags: tags.iter().map(serialize_ranked_tag).collect(),
        first_tag_title: tags.first().map(|t| t.tag.title.clone()),
        first_tag_url: tags.first().map(|t| t.tag.absolute_url()),
    }
}

pub fn serialize_comment(comment: &CommentWithAuthor) -> CommentView {
    CommentView {
        text: comment.text.clone(),
        published_at: comment.published_at.clone(),
        published_label: published_label(&comment.published_at),
        author: comment.author_name.clone(),
    }
}

pub fn serialize_post_detail(
    summary: &PostSummary,
    comments: &[CommentWithAuthor],
    tags: &[RankedTag],
    media_url: &str,
) -> PostDetailView {
    let post = &summary.post;
    PostDetailView {
        title: post.title.clone(),
        text: post.text.clone(),
        author: summary.author_name.clone(),
        comments: comments.iter().map(serialize_comment).collect(),
        likes_amount: summary.likes_count,
        image_url: image_url(media_url, post.image.as_deref()),
        published_at: post.published_at.clone(),
        published_label: published_label(&post.published_at),
        slug: post.slug.clone(),
        tags: tags.iter().map(serialize_ranked_tag).collect(),
    }
}
