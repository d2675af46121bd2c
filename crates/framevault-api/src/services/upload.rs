//! Upload orchestration
//!
//! Validates the file, persists the bytes, records the video as pending, and
//! enqueues frame extraction. Enqueue failure does not fail the upload; the
//! record stays pending and the failure is logged.

use crate::error::HttpAppError;
use crate::state::AppState;
use framevault_core::{ProcessingJob, Video, VideoStatus};

pub struct UploadService;

impl UploadService {
    /// Accept an upload end to end. Returns the pending video record.
    pub async fn handle_upload(
        state: &AppState,
        user_id: Option<i64>,
        title: &str,
        filename: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<Video, HttpAppError> {
        // Correlation id doubles as the storage name prefix and the scratch
        // directory name for extraction.
        let correlation_id = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();

        state
            .validator
            .validate(filename, content_type, data.len())?;

        let size_bytes = data.len();
        let location = state.storage.store(filename, &correlation_id, data).await?;

        tracing::info!(
            correlation_id = %correlation_id,
            filename = %filename,
            size_bytes = size_bytes,
            location = %location,
            "Upload stored"
        );

        let video = state
            .store
            .create(user_id, title, &location, VideoStatus::Pending)
            .await?;

        let job = ProcessingJob {
            video_id: video.id,
            file_path: location,
            correlation_id,
            user_id,
        };

        if let Err(e) = state.jobs.submit(job).await {
            // The video stays pending; an operator can resubmit it later.
            tracing::warn!(
                error = %e,
                video_id = video.id,
                "Failed to enqueue frame extraction job"
            );
        }

        Ok(video)
    }
}
