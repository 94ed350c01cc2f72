mod common;

use axum::http::StatusCode;
use common::{body_string, day, TestApp, MEDIA_URL};
use tagblog::routes::blog::{tag_filter_page, TAG_FILTER_LIMIT};

#[tokio::test]
async fn tag_with_25_posts_returns_20() {
    let app = TestApp::new().await;
    let author = app.create_user("alice").await;
    for n in 1..=25 {
        let post = app
            .create_post(&author, &format!("Post {n}"), &format!("post-{n}"), &day(n))
            .await;
        app.tag_post(&post, "python").await;
    }

    let page = tag_filter_page(&app.db, MEDIA_URL, "python").await.unwrap();
    assert_eq!(page.posts.len(), TAG_FILTER_LIMIT as usize);
    assert_eq!(page.posts.len(), 20);
    assert_eq!(page.posts[0].slug, "post-25");
    assert_eq!(page.posts[19].slug, "post-6");
    assert_eq!(page.popular_tags[0].posts_with_tag, 25);
}

#[tokio::test]
async fn tag_filter_only_lists_matching_posts() {
    let app = TestApp::new().await;
    let author = app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    let rust = app.create_post(&author, "Rust Article", "rust-article", &day(1)).await;
    let other = app.create_post(&author, "Garden Notes", "garden-notes", &day(2)).await;
    app.tag_post(&rust, "rust").await;
    app.tag_post(&other, "garden").await;
    app.add_comment(&rust, &bob, "Great read", &day(3)).await;

    let page = tag_filter_page(&app.db, MEDIA_URL, "rust").await.unwrap();
    assert_eq!(page.tag, "rust");
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].title, "Rust Article");
    assert_eq!(page.posts[0].comments_amount, 1);
    assert_eq!(page.posts[0].first_tag_title.as_deref(), Some("rust"));

    let resp = app.get("/tag/rust").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Posts tagged #rust"));
    assert!(html.contains("Rust Article"));
    assert!(!html.contains("Body of Garden Notes"));
}

#[tokio::test]
async fn tag_filter_normalizes_requested_title() {
    let app = TestApp::new().await;
    let author = app.create_user("alice").await;
    let post = app.create_post(&author, "Snakes", "snakes", &day(1)).await;
    app.tag_post(&post, "python").await;

    let page = tag_filter_page(&app.db, MEDIA_URL, "Python").await.unwrap();
    assert_eq!(page.tag, "python");
    assert_eq!(page.posts.len(), 1);

    let resp = app.get("/tag/PYTHON").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Snakes"));
}

#[tokio::test]
async fn unknown_tag_shows_empty_list() {
    let app = TestApp::new().await;
    let resp = app.get("/tag/nonexistent").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("No posts with this tag."));
}

#[tokio::test]
async fn tag_links_with_reserved_characters_reach_the_tag_page() {
    let app = TestApp::new().await;
    let author = app.create_user("alice").await;
    let post = app.create_post(&author, "Sharp Notes", "sharp-notes", &day(1)).await;
    app.tag_post(&post, "c#").await;

    let html = body_string(app.get("/").await).await;
    assert!(html.contains(r#"href="/tag/c%23""#));
    assert!(!html.contains(r#"href="/tag/c#""#));

    let resp = app.get("/tag/c%23").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Posts tagged #c#"));
    assert!(html.contains("Body of Sharp Notes"));

    let html = body_string(app.get("/tag/c").await).await;
    assert!(html.contains("No posts with this tag."));
}
