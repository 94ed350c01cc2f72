mod common;

use axum::http::StatusCode;
use common::{body_string, TestApp};

#[tokio::test]
async fn contacts_page_renders() {
    let app = TestApp::new().await;
    let resp = app.get("/contacts").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("<h2>Contacts</h2>"));
    assert!(html.contains(tagblog::ASSET_HASH));
}

#[tokio::test]
async fn health_returns_ok() {
    let app = TestApp::new().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "ok");
}

#[tokio::test]
async fn static_assets_are_cacheable() {
    let app = TestApp::new().await;
    let resp = app.get("/static/style.css").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cache = resp
        .headers()
        .get("cache-control")
        .expect("static assets should set cache-control")
        .to_str()
        .unwrap();
    assert_eq!(cache, "public, max-age=86400");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::new().await;
    let resp = app.get("/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
