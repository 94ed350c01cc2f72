//! Popularity ranking and batch annotation queries.
//!
//! Aggregates are computed in SQL where a single statement suffices and
//! otherwise fetched in one keyed batch and merged in memory, so a page never
//! issues one query per listed post.

use std::collections::HashMap;

use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::models::{CommentWithAuthor, Post, Tag};

/// A post joined with its author's name and distinct liker count.
///
/// `comments_count` stays `None` until [`fetch_with_comments_count`] fills it.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author_name: String,
    pub likes_count: i64,
    pub comments_count: Option<i64>,
}

/// A tag with the number of distinct posts carrying it.
#[derive(Debug, Clone)]
pub struct RankedTag {
    pub tag: Tag,
    pub posts_count: i64,
}

#[derive(FromRow)]
struct PostSummaryRow {
    id: String,
    author_id: String,
    title: String,
    text: String,
    slug: String,
    image: Option<String>,
    published_at: String,
    author_name: String,
    likes_count: i64,
}

impl PostSummaryRow {
    fn into_summary(self) -> PostSummary {
        PostSummary {
            post: Post {
                id: self.id,
                author_id: self.author_id,
                title: self.title,
                text: self.text,
                slug: self.slug,
                image: self.image,
                published_at: self.published_at,
            },
            author_name: self.author_name,
            likes_count: self.likes_count,
            comments_count: None,
        }
    }
}

#[derive(FromRow)]
struct RankedTagRow {
    id: String,
    title: String,
    posts_count: i64,
}

impl RankedTagRow {
    fn into_ranked(self) -> RankedTag {
        RankedTag {
            tag: Tag {
                id: self.id,
                title: self.title,
            },
            posts_count: self.posts_count,
        }
    }
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: String,
    id: String,
    title: String,
    posts_count: i64,
}

const SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.author_id, p.title, p.text, p.slug, p.image, p.published_at,
           u.username AS author_name,
           COUNT(DISTINCT l.user_id) AS likes_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_likes l ON l.post_id = p.id
"#;

/// Tags ordered by distinct post count, most popular first.
///
/// Equal counts fall back to title, then id, both ascending.
pub async fn popular_tags(db: &SqlitePool, limit: i64) -> Result<Vec<RankedTag>, sqlx::Error> {
    let rows: Vec<RankedTagRow> = sqlx::query_as(
        r#"
        SELECT t.id, t.title, COUNT(DISTINCT pt.post_id) AS posts_count
        FROM tags t
        LEFT JOIN post_tags pt ON pt.tag_id = t.id
        GROUP BY t.id
        ORDER BY posts_count DESC, t.title ASC, t.id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(RankedTagRow::into_ranked).collect())
}

/// Posts ordered by distinct liker count, most liked first.
///
/// Equal counts fall back to newest first, then id ascending.
pub async fn popular_posts(db: &SqlitePool, limit: i64) -> Result<Vec<PostSummary>, sqlx::Error> {
    let sql = format!(
        "{SUMMARY_SELECT}
        GROUP BY p.id
        ORDER BY likes_count DESC, p.published_at DESC, p.id ASC
        LIMIT ?"
    );
    let rows: Vec<PostSummaryRow> = sqlx::query_as(&sql).bind(limit).fetch_all(db).await?;

    Ok(rows.into_iter().map(PostSummaryRow::into_summary).collect())
}

/// The most recently published posts, newest first.
pub async fn fresh_posts(db: &SqlitePool, limit: i64) -> Result<Vec<PostSummary>, sqlx::Error> {
    let sql = format!(
        "{SUMMARY_SELECT}
        GROUP BY p.id
        ORDER BY p.published_at DESC, p.id ASC
        LIMIT ?"
    );
    let rows: Vec<PostSummaryRow> = sqlx::query_as(&sql).bind(limit).fetch_all(db).await?;

    Ok(rows.into_iter().map(PostSummaryRow::into_summary).collect())
}

/// Posts carrying the tag with the given (already normalized) title, newest first.
pub async fn posts_for_tag(
    db: &SqlitePool,
    tag_title: &str,
    limit: i64,
) -> Result<Vec<PostSummary>, sqlx::Error> {
    let sql = format!(
        "{SUMMARY_SELECT}
        WHERE p.id IN (
            SELECT pt.post_id FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE t.title = ?
        )
        GROUP BY p.id
        ORDER BY p.published_at DESC, p.id ASC
        LIMIT ?"
    );
    let rows: Vec<PostSummaryRow> = sqlx::query_as(&sql)
        .bind(tag_title)
        .bind(limit)
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(PostSummaryRow::into_summary).collect())
}

/// Look a post up by slug. Slugs are not unique; the newest match wins.
pub async fn post_by_slug(db: &SqlitePool, slug: &str) -> Result<Option<PostSummary>, sqlx::Error> {
    let sql = format!(
        "{SUMMARY_SELECT}
        WHERE p.slug = ?
        GROUP BY p.id
        ORDER BY p.published_at DESC, p.id ASC
        LIMIT 1"
    );
    let row: Option<PostSummaryRow> = sqlx::query_as(&sql).bind(slug).fetch_optional(db).await?;

    Ok(row.map(PostSummaryRow::into_summary))
}

/// Comments on a post, oldest first.
pub async fn comments_for_post(
    db: &SqlitePool,
    post_id: &str,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.username AS author_name
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.published_at ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}

/// Comment counts for the given posts in one query. Posts without comments
/// are absent from the map.
pub async fn comment_counts(
    db: &SqlitePool,
    post_ids: &[&str],
) -> Result<HashMap<String, i64>, sqlx::Error> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT post_id, COUNT(id) FROM comments WHERE post_id IN (");
    let mut ids = query.separated(", ");
    for id in post_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") GROUP BY post_id");

    let rows: Vec<(String, i64)> = query.build_query_as().fetch_all(db).await?;
    Ok(rows.into_iter().collect())
}

/// Annotate each post with its comment count, fetched in a single batch.
pub async fn fetch_with_comments_count(
    db: &SqlitePool,
    posts: Vec<PostSummary>,
) -> Result<Vec<PostSummary>, sqlx::Error> {
    let ids: Vec<&str> = posts.iter().map(|p| p.post.id.as_str()).collect();
    let counts = comment_counts(db, &ids).await?;

    Ok(posts
        .into_iter()
        .map(|mut summary| {
            summary.comments_count = Some(counts.get(&summary.post.id).copied().unwrap_or(0));
            summary
        })
        .collect())
}

/// Tags of every given post, each with its total post count, keyed by post id.
///
/// Per-post tag lists are ordered by title so the first entry is stable.
pub async fn tags_for_posts(
    db: &SqlitePool,
    post_ids: &[&str],
) -> Result<HashMap<String, Vec<RankedTag>>, sqlx::Error> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT pt.post_id, t.id, t.title,
               (SELECT COUNT(DISTINCT x.post_id) FROM post_tags x WHERE x.tag_id = t.id) AS posts_count
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN (
        "#,
    );
    let mut ids = query.separated(", ");
    for id in post_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") ORDER BY t.title ASC, t.id ASC");

    let rows: Vec<PostTagRow> = query.build_query_as().fetch_all(db).await?;

    let mut by_post: HashMap<String, Vec<RankedTag>> = HashMap::new();
    for row in rows {
        by_post.entry(row.post_id).or_default().push(RankedTag {
            tag: Tag {
                id: row.id,
                title: row.title,
            },
            posts_count: row.posts_count,
        });
    }
    Ok(by_post)
}
