use askama::Template;
use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::AppState;

#[derive(Template)]
#[template(path = "contacts.html")]
struct ContactsTemplate {
    asset_hash: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contacts", get(contacts))
}

// TODO: record page visits and accept feedback submissions here.
async fn contacts() -> Result<impl IntoResponse, AppError> {
    let template = ContactsTemplate {
        asset_hash: crate::ASSET_HASH,
    };
    Ok(Html(template.render()?))
}
