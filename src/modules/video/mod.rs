use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

pub mod dto;
pub mod error;
pub mod handler;
pub mod service;
pub mod validator;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(handler::index))
        .route(
            "/generate",
            // Headroom over the file limit for multipart framing.
            post(handler::generate).layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(64 * 1024))),
        )
}
