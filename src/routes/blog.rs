use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::Tag;
use crate::ranking::{self, PostSummary};
use crate::views::{self, PostDetailView, PostView, TagView};
use crate::AppState;

pub const POPULAR_POSTS_LIMIT: i64 = 5;
pub const POPULAR_TAGS_LIMIT: i64 = 5;
pub const FRESH_POSTS_LIMIT: i64 = 5;
pub const TAG_FILTER_LIMIT: i64 = 20;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub most_popular_posts: Vec<PostView>,
    pub page_posts: Vec<PostView>,
    pub popular_tags: Vec<TagView>,
    pub asset_hash: &'static str,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub post: PostDetailView,
    pub most_popular_posts: Vec<PostView>,
    pub popular_tags: Vec<TagView>,
    pub asset_hash: &'static str,
}

#[derive(Template)]
#[template(path = "posts_list.html")]
pub struct PostsListTemplate {
    pub tag: String,
    pub posts: Vec<PostView>,
    pub most_popular_posts: Vec<PostView>,
    pub popular_tags: Vec<TagView>,
    pub asset_hash: &'static str,
}

/// Popular posts and tags shown beside every listing page.
struct Sidebars {
    most_popular_posts: Vec<PostView>,
    popular_tags: Vec<TagView>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/post/{slug}", get(post_detail))
        .route("/tag/{tag_title}", get(tag_filter))
}

/// Annotate posts with comment counts and tags in two batch queries, then serialize.
async fn serialize_posts(
    db: &SqlitePool,
    posts: Vec<PostSummary>,
    media_url: &str,
) -> Result<Vec<PostView>, sqlx::Error> {
    let posts = ranking::fetch_with_comments_count(db, posts).await?;
    let ids: Vec<&str> = posts.iter().map(|p| p.post.id.as_str()).collect();
    let tags = ranking::tags_for_posts(db, &ids).await?;

    Ok(posts
        .iter()
        .map(|summary| {
            let post_tags = tags.get(&summary.post.id).map(Vec::as_slice).unwrap_or(&[]);
            views::serialize_post(summary, post_tags, media_url)
        })
        .collect())
}

async fn sidebars(db: &SqlitePool, media_url: &str) -> Result<Sidebars, sqlx::Error> {
    let popular = ranking::popular_posts(db, POPULAR_POSTS_LIMIT).await?;
    let most_popular_posts = serialize_posts(db, popular, media_url).await?;

    let popular_tags = ranking::popular_tags(db, POPULAR_TAGS_LIMIT)
        .await?
        .iter()
        .map(views::serialize_ranked_tag)
        .collect();

    Ok(Sidebars {
        most_popular_posts,
        popular_tags,
    })
}

pub async fn index_page(db: &SqlitePool, media_url: &str) -> Result<IndexTemplate, AppError> {
    let Sidebars {
        most_popular_posts,
        popular_tags,
    } = sidebars(db, media_url).await?;

    let fresh = ranking::fresh_posts(db, FRESH_POSTS_LIMIT).await?;
    let page_posts = serialize_posts(db, fresh, media_url).await?;

    Ok(IndexTemplate {
        most_popular_posts,
        page_posts,
        popular_tags,
        asset_hash: crate::ASSET_HASH,
    })
}

pub async fn post_detail_page(
    db: &SqlitePool,
    media_url: &str,
    slug: &str,
) -> Result<PostDetailTemplate, AppError> {
    let Some(summary) = ranking::post_by_slug(db, slug).await? else {
        return Err(AppError::NotFound);
    };

    let comments = ranking::comments_for_post(db, &summary.post.id).await?;
    let mut tags = ranking::tags_for_posts(db, &[summary.post.id.as_str()]).await?;
    let post_tags = tags.remove(&summary.post.id).unwrap_or_default();

    let post = views::serialize_post_detail(&summary, &comments, &post_tags, media_url);

    let Sidebars {
        most_popular_posts,
        popular_tags,
    } = sidebars(db, media_url).await?;

    Ok(PostDetailTemplate {
        post,
        most_popular_posts,
        popular_tags,
        asset_hash: crate::ASSET_HASH,
    })
}

pub async fn tag_filter_page(
    db: &SqlitePool,
    media_url: &str,
    tag_title: &str,
) -> Result<PostsListTemplate, AppError> {
    let tag = Tag::normalize_title(tag_title);

    let related = ranking::posts_for_tag(db, &tag, TAG_FILTER_LIMIT).await?;
    let posts = serialize_posts(db, related, media_url).await?;

    let Sidebars {
        most_popular_posts,
        popular_tags,
    } = sidebars(db, media_url).await?;

    Ok(PostsListTemplate {
        tag,
        posts,
        most_popular_posts,
        popular_tags,
        asset_hash: crate::ASSET_HASH,
    })
}

async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let page = index_page(&state.db, &state.media_url).await?;
    Ok(Html(page.render()?))
}

async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = post_detail_page(&state.db, &state.media_url, &slug).await?;
    Ok(Html(page.render()?))
}

async fn tag_filter(
    State(state): State<AppState>,
    Path(tag_title): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = tag_filter_page(&state.db, &state.media_url, &tag_title).await?;
    Ok(Html(page.render()?))
}
