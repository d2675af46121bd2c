//! Terminal job handler for frame extraction.

use framevault_core::{ProcessingJob, VideoStatus};
use framevault_db::VideoStore;
use framevault_processing::FrameExtractor;
use std::sync::Arc;

/// Drives a single job to a terminal state: ready (with the archive path) or
/// failed. When the ready update cannot be applied the record is driven to
/// failed instead. Never propagates errors; a failed status update is only
/// logged so a broken database cannot wedge the worker loop.
///
/// Duplicate delivery is safe: re-extraction overwrites the archive and
/// re-applies the same terminal status.
pub struct ProcessVideoHandler {
    store: Arc<dyn VideoStore>,
    extractor: Arc<dyn FrameExtractor>,
}

impl ProcessVideoHandler {
    pub fn new(store: Arc<dyn VideoStore>, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self { store, extractor }
    }

    #[tracing::instrument(skip(self), fields(video_id = job.video_id, correlation_id = %job.correlation_id))]
    pub async fn handle_job(&self, job: &ProcessingJob) {
        let start = std::time::Instant::now();
        tracing::info!("Starting frame extraction job");

        match self
            .extractor
            .extract(&job.file_path, &job.correlation_id)
            .await
        {
            Ok(extraction) => {
                tracing::info!(
                    frame_count = extraction.frame_count,
                    archive = %extraction.archive_path,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Frame extraction succeeded"
                );
                if let Err(e) = self
                    .store
                    .update_status(job.video_id, VideoStatus::Ready, Some(&extraction.archive_path))
                    .await
                {
                    // A record that cannot be marked ready must not stay
                    // pending; drive it to failed so the state stays terminal.
                    tracing::error!(error = %e, "Failed to mark video ready, marking failed");
                    if let Err(fallback_err) = self
                        .store
                        .update_status(job.video_id, VideoStatus::Failed, None)
                        .await
                    {
                        tracing::error!(error = %fallback_err, "Failed to mark video failed");
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Frame extraction failed"
                );
                if let Err(update_err) = self
                    .store
                    .update_status(job.video_id, VideoStatus::Failed, None)
                    .await
                {
                    tracing::error!(error = %update_err, "Failed to mark video failed");
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use framevault_core::{AppError, Video};
    use framevault_processing::{ExtractError, Extraction};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory video store for worker tests.
    pub struct MemoryVideoStore {
        videos: Mutex<HashMap<i64, Video>>,
    }

    impl MemoryVideoStore {
        pub fn with_video(video: Video) -> Self {
            let mut videos = HashMap::new();
            videos.insert(video.id, video);
            Self {
                videos: Mutex::new(videos),
            }
        }

        pub fn get(&self, id: i64) -> Option<Video> {
            self.videos.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl VideoStore for MemoryVideoStore {
        async fn create(
            &self,
            user_id: Option<i64>,
            title: &str,
            file_path: &str,
            status: VideoStatus,
        ) -> Result<Video, AppError> {
            let mut videos = self.videos.lock().unwrap();
            let id = videos.keys().max().copied().unwrap_or(0) + 1;
            let video = Video {
                id,
                user_id,
                title: Some(title.to_string()),
                file_path: Some(file_path.to_string()),
                status,
            };
            videos.insert(id, video.clone());
            Ok(video)
        }

        async fn update_status(
            &self,
            video_id: i64,
            status: VideoStatus,
            file_path: Option<&str>,
        ) -> Result<Video, AppError> {
            let mut videos = self.videos.lock().unwrap();
            let video = videos
                .get_mut(&video_id)
                .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
            video.status = status;
            if let Some(path) = file_path {
                video.file_path = Some(path.to_string());
            }
            Ok(video.clone())
        }

        async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Video>, AppError> {
            let videos = self.videos.lock().unwrap();
            let mut owned: Vec<Video> = videos
                .values()
                .filter(|v| v.user_id == Some(user_id))
                .cloned()
                .collect();
            owned.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(owned)
        }
    }

    /// Scripted extractor for worker tests.
    pub struct FakeExtractor {
        pub fail: bool,
    }

    #[async_trait]
    impl FrameExtractor for FakeExtractor {
        async fn extract(
            &self,
            _video_location: &str,
            correlation_id: &str,
        ) -> Result<Extraction, ExtractError> {
            if self.fail {
                Err(ExtractError::NoFrames)
            } else {
                Ok(Extraction {
                    archive_path: format!("outputs/frames_{}.zip", correlation_id),
                    frame_count: 3,
                    frame_names: vec![
                        "frame_0001.png".to_string(),
                        "frame_0002.png".to_string(),
                        "frame_0003.png".to_string(),
                    ],
                })
            }
        }
    }

    fn pending_video(id: i64) -> Video {
        Video {
            id,
            user_id: Some(1),
            title: Some("demo".to_string()),
            file_path: Some("uploads/20240101_120000_demo.mp4".to_string()),
            status: VideoStatus::Pending,
        }
    }

    fn job_for(video: &Video) -> ProcessingJob {
        ProcessingJob {
            video_id: video.id,
            file_path: video.file_path.clone().unwrap(),
            correlation_id: "20240101_120000".to_string(),
            user_id: video.user_id,
        }
    }

    #[tokio::test]
    async fn test_success_marks_ready_with_archive() {
        let video = pending_video(1);
        let job = job_for(&video);
        let store = Arc::new(MemoryVideoStore::with_video(video));
        let handler =
            ProcessVideoHandler::new(store.clone(), Arc::new(FakeExtractor { fail: false }));

        handler.handle_job(&job).await;

        let updated = store.get(1).unwrap();
        assert_eq!(updated.status, VideoStatus::Ready);
        assert_eq!(
            updated.file_path.as_deref(),
            Some("outputs/frames_20240101_120000.zip")
        );
    }

    #[tokio::test]
    async fn test_failure_marks_failed_and_keeps_path() {
        let video = pending_video(1);
        let original_path = video.file_path.clone();
        let job = job_for(&video);
        let store = Arc::new(MemoryVideoStore::with_video(video));
        let handler =
            ProcessVideoHandler::new(store.clone(), Arc::new(FakeExtractor { fail: true }));

        handler.handle_job(&job).await;

        let updated = store.get(1).unwrap();
        assert_eq!(updated.status, VideoStatus::Failed);
        assert_eq!(updated.file_path, original_path);
    }

    /// Store that rejects ready updates but still accepts failed ones, as a
    /// partially broken database would.
    struct ReadyRejectingStore {
        inner: MemoryVideoStore,
    }

    #[async_trait]
    impl VideoStore for ReadyRejectingStore {
        async fn create(
            &self,
            user_id: Option<i64>,
            title: &str,
            file_path: &str,
            status: VideoStatus,
        ) -> Result<Video, AppError> {
            self.inner.create(user_id, title, file_path, status).await
        }

        async fn update_status(
            &self,
            video_id: i64,
            status: VideoStatus,
            file_path: Option<&str>,
        ) -> Result<Video, AppError> {
            if status == VideoStatus::Ready {
                return Err(AppError::Internal("connection lost".to_string()));
            }
            self.inner.update_status(video_id, status, file_path).await
        }

        async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Video>, AppError> {
            self.inner.list_by_owner(user_id).await
        }
    }

    #[tokio::test]
    async fn test_ready_update_failure_marks_failed() {
        let video = pending_video(1);
        let job = job_for(&video);
        let store = Arc::new(ReadyRejectingStore {
            inner: MemoryVideoStore::with_video(video),
        });
        let handler =
            ProcessVideoHandler::new(store.clone(), Arc::new(FakeExtractor { fail: false }));

        handler.handle_job(&job).await;

        // Extraction succeeded but the ready update was rejected; the record
        // must not be left pending.
        assert_eq!(store.inner.get(1).unwrap().status, VideoStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_record_does_not_panic() {
        let store = Arc::new(MemoryVideoStore::with_video(pending_video(1)));
        let handler =
            ProcessVideoHandler::new(store.clone(), Arc::new(FakeExtractor { fail: false }));

        let job = ProcessingJob {
            video_id: 999,
            file_path: "uploads/missing.mp4".to_string(),
            correlation_id: "20240101_120000".to_string(),
            user_id: None,
        };
        // Update fails with NotFound internally; handler must swallow it.
        handler.handle_job(&job).await;

        assert_eq!(store.get(1).unwrap().status, VideoStatus::Pending);
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_idempotent() {
        let video = pending_video(1);
        let job = job_for(&video);
        let store = Arc::new(MemoryVideoStore::with_video(video));
        let handler =
            ProcessVideoHandler::new(store.clone(), Arc::new(FakeExtractor { fail: false }));

        handler.handle_job(&job).await;
        handler.handle_job(&job).await;

        let updated = store.get(1).unwrap();
        assert_eq!(updated.status, VideoStatus::Ready);
    }
}
