use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::post::{format_timestamp, parse_timestamp, POST_TITLE_MAX_LENGTH};
use crate::models::tag::TAG_TITLE_MAX_LENGTH;
use crate::models::{Comment, Post, Tag, User};

#[derive(Parser)]
#[command(author, version, about = "A small tag blog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create a user who can author posts, like and comment
    CreateUser {
        username: String,
    },

    /// Import posts with their tags, likes and comments from a JSON file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Deserialize)]
struct ImportedPost {
    title: String,
    text: String,
    slug: String,
    author: String,
    image: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    likes: Vec<String>,
    #[serde(default)]
    comments: Vec<ImportedComment>,
}

#[derive(Deserialize)]
struct ImportedComment {
    author: String,
    text: String,
    published_at: Option<String>,
}

/// Counts reported after an import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
}

fn normalize_timestamp(raw: Option<&str>, now: &str) -> Result<String> {
    match raw {
        None => Ok(now.to_string()),
        Some(raw) => parse_timestamp(raw)
            .map(format_timestamp)
            .with_context(|| format!("invalid timestamp: {raw}")),
    }
}

fn validate_post(post: &ImportedPost) -> Result<()> {
    ensure!(
        Post::is_valid_slug(&post.slug),
        "invalid slug: {:?} (use letters, digits, '-' or '_')",
        post.slug
    );
    ensure!(
        post.title.chars().count() <= POST_TITLE_MAX_LENGTH,
        "post title longer than {POST_TITLE_MAX_LENGTH} characters: {}",
        post.slug
    );
    Ok(())
}

async fn find_or_create_user(conn: &mut SqliteConnection, username: &str) -> Result<String> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username.trim())
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let user = User::new(username.to_string());
    sqlx::query("INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.created_at)
        .execute(&mut *conn)
        .await?;
    tracing::info!(username = %user.username, "created user");
    Ok(user.id)
}

async fn find_or_create_tag(conn: &mut SqliteConnection, title: &str) -> Result<Option<String>> {
    let tag = Tag::new(title);
    if tag.title.is_empty() {
        return Ok(None);
    }
    ensure!(
        tag.title.chars().count() <= TAG_TITLE_MAX_LENGTH,
        "tag title longer than {TAG_TITLE_MAX_LENGTH} characters: {}",
        tag.title
    );

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE title = ?")
        .bind(&tag.title)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some((id,)) = existing {
        return Ok(Some(id));
    }

    sqlx::query("INSERT INTO tags (id, title) VALUES (?, ?)")
        .bind(&tag.id)
        .bind(&tag.title)
        .execute(&mut *conn)
        .await?;
    Ok(Some(tag.id))
}

/// Import posts from a JSON array in a single transaction.
///
/// Unknown usernames are created on the fly and tag titles are normalized.
pub async fn import_posts(pool: &SqlitePool, json: &str) -> Result<ImportSummary> {
    let posts: Vec<ImportedPost> = serde_json::from_str(json).context("malformed import file")?;

    let now = format_timestamp(Utc::now());
    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;

    for imported in posts {
        validate_post(&imported)?;
        let author_id = find_or_create_user(&mut tx, &imported.author).await?;

        let mut post = Post::new(author_id, imported.title, imported.text, imported.slug);
        post.image = imported.image.filter(|i| !i.trim().is_empty());
        post.published_at = normalize_timestamp(imported.published_at.as_deref(), &now)?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, text, slug, image, published_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(&post.slug)
        .bind(&post.image)
        .bind(&post.published_at)
        .execute(&mut *tx)
        .await?;

        for title in &imported.tags {
            let Some(tag_id) = find_or_create_tag(&mut tx, title).await? else {
                continue;
            };
            sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(&post.id)
                .bind(&tag_id)
                .execute(&mut *tx)
                .await?;
        }

        let mut likers = HashSet::new();
        for username in &imported.likes {
            let user_id = find_or_create_user(&mut tx, username).await?;
            if !likers.insert(user_id.clone()) {
                continue;
            }
            sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                .bind(&post.id)
                .bind(&user_id)
                .execute(&mut *tx)
                .await?;
            summary.likes += 1;
        }

        for imported_comment in imported.comments {
            let author_id = find_or_create_user(&mut tx, &imported_comment.author).await?;
            let mut comment = Comment::new(post.id.clone(), author_id, imported_comment.text);
            comment.published_at =
                normalize_timestamp(imported_comment.published_at.as_deref(), &now)?;

            sqlx::query(
                "INSERT INTO comments (id, post_id, author_id, text, published_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&comment.id)
            .bind(&comment.post_id)
            .bind(&comment.author_id)
            .bind(&comment.text)
            .bind(&comment.published_at)
            .execute(&mut *tx)
            .await?;
            summary.comments += 1;
        }

        summary.posts += 1;
    }

    tx.commit().await?;
    tracing::info!(
        posts = summary.posts,
        comments = summary.comments,
        likes = summary.likes,
        "import finished"
    );
    Ok(summary)
}

pub async fn import_file(pool: &SqlitePool, file: &Path) -> Result<ImportSummary> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    import_posts(pool, &content).await
}

pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<User> {
    let user = User::new(username.to_string());
    ensure!(!user.username.is_empty(), "username must not be empty");

    sqlx::query("INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.created_at)
        .execute(pool)
        .await
        .with_context(|| format!("failed to create user {}", user.username))?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Username: {}", user.username);

    Ok(user)
}
