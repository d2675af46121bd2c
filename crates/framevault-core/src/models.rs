//! Domain models shared across Framevault components.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing lifecycle of an uploaded video.
///
/// Stored as a SMALLINT in the database and serialized as its numeric value:
/// 0 = pending, 1 = ready, 2 = failed. Both terminal states are final; there
/// is no retry transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum VideoStatus {
    Pending,
    Ready,
    Failed,
}

impl From<VideoStatus> for i16 {
    fn from(status: VideoStatus) -> Self {
        match status {
            VideoStatus::Pending => 0,
            VideoStatus::Ready => 1,
            VideoStatus::Failed => 2,
        }
    }
}

impl TryFrom<i16> for VideoStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VideoStatus::Pending),
            1 => Ok(VideoStatus::Ready),
            2 => Ok(VideoStatus::Failed),
            other => Err(format!("Invalid video status: {}", other)),
        }
    }
}

/// A video record as persisted in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub file_path: Option<String>,
    pub status: VideoStatus,
}

/// A frame extraction job handed from the upload path to the worker.
///
/// The payload is small by design: the worker re-reads everything else it
/// needs from the database, so duplicate delivery is harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    pub video_id: i64,
    pub file_path: String,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Video fields exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoData {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub file_path: Option<String>,
    pub status: i16,
}

impl From<Video> for VideoData {
    fn from(video: Video) -> Self {
        VideoData {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            file_path: video.file_path,
            status: video.status.into(),
        }
    }
}

/// Envelope for a single-video response: `{"status": "success", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    pub data: VideoData,
}

impl UploadResponse {
    pub fn success(video: Video) -> Self {
        UploadResponse {
            status: "success".to_string(),
            data: video.into(),
        }
    }
}

/// Envelope for a video listing response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoListResponse {
    pub status: String,
    pub data: Vec<VideoData>,
}

impl VideoListResponse {
    pub fn success(videos: Vec<Video>) -> Self {
        VideoListResponse {
            status: "success".to_string(),
            data: videos.into_iter().map(Into::into).collect(),
        }
    }
}
