/// Embedded client assets
///
/// Compiled into the binary so deployment is a single file.

use axum::{http::header, response::IntoResponse};

const SCRIPT: &str = include_str!("../../static/app.js");
const STYLESHEET: &str = include_str!("../../static/app.css");

const ASSET_CACHE: &str = "public, max-age=3600";

/// `GET /static/app.js`
pub async fn script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, ASSET_CACHE),
        ],
        SCRIPT,
    )
}

/// `GET /static/app.css`
pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, ASSET_CACHE),
        ],
        STYLESHEET,
    )
}
