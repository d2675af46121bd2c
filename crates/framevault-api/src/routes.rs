//! Router assembly.

use crate::api_doc::serve_openapi;
use crate::handlers::{health, upload, videos};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // Body limit sits above the validator's ceiling so oversize uploads get a
    // structured 413 from validation instead of a bare rejection.
    let body_limit = state.config.max_upload_size_bytes + 1024 * 1024;

    Router::new()
        .route("/upload/video", post(upload::upload_video))
        .route("/upload/videos/{user_id}", get(videos::list_videos))
        .route("/health/", get(health::liveness_check))
        .route("/health/db", get(health::readiness_check))
        .route("/api-docs/openapi.json", get(serve_openapi))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
