pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod views;

pub const ASSET_HASH: &str = env!("ASSET_HASH");

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub media_url: Arc<str>,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
/// `media_url` is the public prefix under which stored post images are served.
pub fn build_app(pool: SqlitePool, media_url: &str) -> Router {
    let state = AppState {
        db: pool,
        media_url: Arc::from(media_url),
    };

    Router::new()
        .route("/health", get(health))
        .merge(routes::blog::router())
        .merge(routes::contacts::router())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ))
                .service(ServeDir::new("static")),
        )
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
