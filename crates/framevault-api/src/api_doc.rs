//! OpenAPI document served at /api-docs/openapi.json.

use axum::Json;
use framevault_core::{UploadResponse, VideoData, VideoListResponse};
use utoipa::OpenApi;

use crate::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Framevault API",
        description = "Video upload service with asynchronous frame extraction"
    ),
    paths(
        crate::handlers::upload::upload_video,
        crate::handlers::videos::list_videos,
    ),
    components(schemas(VideoData, UploadResponse, VideoListResponse, ErrorResponse)),
    tags((name = "upload", description = "Video upload and listing"))
)]
pub struct ApiDoc;

pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
