#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const MEDIA_URL: &str = "/media/";

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = tagblog::build_app(pool.clone(), MEDIA_URL);

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Create a user in the database and return its id.
    pub async fn create_user(&self, username: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(username)
            .bind(&now)
            .execute(&self.db)
            .await
            .expect("Failed to create test user");

        id
    }

    /// Create a post and return its id. `published_at` must be RFC 3339 UTC.
    pub async fn create_post(
        &self,
        author_id: &str,
        title: &str,
        slug: &str,
        published_at: &str,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO posts (id, author_id, title, text, slug, image, published_at) VALUES (?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(&id)
        .bind(author_id)
        .bind(title)
        .bind(format!("Body of {title}"))
        .bind(slug)
        .bind(published_at)
        .execute(&self.db)
        .await
        .expect("Failed to create test post");

        id
    }

    pub async fn set_image(&self, post_id: &str, image: &str) {
        sqlx::query("UPDATE posts SET image = ? WHERE id = ?")
            .bind(image)
            .bind(post_id)
            .execute(&self.db)
            .await
            .unwrap();
    }

    /// Attach a tag (created if missing) to a post. Returns the tag id.
    pub async fn tag_post(&self, post_id: &str, title: &str) -> String {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE title = ?")
            .bind(title)
            .fetch_optional(&self.db)
            .await
            .unwrap();

        let tag_id = match existing {
            Some((id,)) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query("INSERT INTO tags (id, title) VALUES (?, ?)")
                    .bind(&id)
                    .bind(title)
                    .execute(&self.db)
                    .await
                    .unwrap();
                id
            }
        };

        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(&tag_id)
            .execute(&self.db)
            .await
            .unwrap();

        tag_id
    }

    pub async fn like_post(&self, post_id: &str, user_id: &str) {
        sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .unwrap();
    }

    pub async fn add_comment(&self, post_id: &str, author_id: &str, text: &str, published_at: &str) {
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, text, published_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .bind(published_at)
        .execute(&self.db)
        .await
        .unwrap();
    }
}

/// Timestamp `n` days into 2024, handy for ordering posts deterministically.
pub fn day(n: u32) -> String {
    format!("2024-01-{:02}T12:00:00Z", n)
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert that `first` appears before `second` in `html`.
pub fn assert_before(html: &str, first: &str, second: &str) {
    let a = html
        .find(first)
        .unwrap_or_else(|| panic!("{first:?} not found in page"));
    let b = html
        .find(second)
        .unwrap_or_else(|| panic!("{second:?} not found in page"));
    assert!(a < b, "expected {first:?} before {second:?}");
}
