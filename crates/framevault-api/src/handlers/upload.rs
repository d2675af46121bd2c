//! Video upload endpoint.

use crate::auth::{authenticate, enforce_same_user};
use crate::error::HttpAppError;
use crate::services::UploadService;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use framevault_core::{AppError, UploadResponse};

/// Upload a video for asynchronous frame extraction.
///
/// Multipart fields: `user_id` (required), `title` (required), `file`
/// (required, must carry a filename).
#[utoipa::path(
    post,
    path = "/upload/video",
    responses(
        (status = 201, description = "Video accepted for processing", body = UploadResponse),
        (status = 400, description = "Invalid field or file"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token does not match user_id"),
        (status = 413, description = "File exceeds size limit")
    ),
    tag = "upload"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let claims = authenticate(&state, &headers).await?;

    let mut user_id: Option<i64> = None;
    let mut title: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("user_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid user_id field: {}", e)))?;
                let parsed = raw.trim().parse::<i64>().map_err(|_| {
                    AppError::InvalidInput(format!("user_id must be an integer, got '{}'", raw))
                })?;
                user_id = Some(parsed);
            }
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Invalid title field: {}", e))
                })?);
            }
            Some("file") => {
                // Metadata must be captured before the body is consumed.
                filename = field.file_name().map(String::from);
                content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file field: {}", e))
                })?;
                data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::InvalidInput("Missing user_id field".to_string()))?;
    let title = title.ok_or_else(|| AppError::InvalidInput("Missing title field".to_string()))?;
    let filename =
        filename.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;
    let data = data.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;

    enforce_same_user(claims.as_ref(), user_id)?;

    let video = UploadService::handle_upload(
        &state,
        Some(user_id),
        &title,
        &filename,
        content_type.as_deref(),
        data,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse::success(video))))
}
