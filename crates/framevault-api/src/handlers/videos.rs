//! Video listing endpoint.

use crate::auth::{authenticate, enforce_same_user};
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use framevault_core::VideoListResponse;

/// List a user's videos, newest first.
#[utoipa::path(
    get,
    path = "/upload/videos/{user_id}",
    params(("user_id" = i64, Path, description = "Owner of the videos")),
    responses(
        (status = 200, description = "Videos for the user", body = VideoListResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token does not match user_id")
    ),
    tag = "upload"
)]
pub async fn list_videos(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<VideoListResponse>, HttpAppError> {
    let claims = authenticate(&state, &headers).await?;
    enforce_same_user(claims.as_ref(), user_id)?;

    let videos = state.store.list_by_owner(user_id).await?;
    Ok(Json(VideoListResponse::success(videos)))
}
