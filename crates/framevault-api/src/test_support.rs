//! Shared fixtures for handler and router tests.

use crate::auth::JwksVerifier;
use crate::state::AppState;
use anyhow::Result;
use async_trait::async_trait;
use framevault_core::{AppError, Config, ProcessingJob, StorageBackend, Video, VideoStatus};
use framevault_db::VideoStore;
use framevault_processing::UploadValidator;
use framevault_storage::LocalStorage;
use framevault_worker::JobQueue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory video store keyed by id.
pub struct MemoryVideoStore {
    videos: Mutex<BTreeMap<i64, Video>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(BTreeMap::new()),
        }
    }

    /// Seed a record with an explicit id.
    pub async fn insert(&self, id: i64, user_id: Option<i64>, title: &str, status: VideoStatus) {
        let mut videos = self.videos.lock().await;
        videos.insert(
            id,
            Video {
                id,
                user_id,
                title: Some(title.to_string()),
                file_path: None,
                status,
            },
        );
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
        let mut videos = self.videos.lock().await;
        let id = videos.keys().next_back().copied().unwrap_or(0) + 1;
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
        let mut videos = self.videos.lock().await;
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
        let videos = self.videos.lock().await;
        Ok(videos
            .values()
            .rev()
            .filter(|v| v.user_id == Some(user_id))
            .cloned()
            .collect())
    }
}

/// Job queue that accepts everything and does nothing.
pub struct NullJobQueue;

#[async_trait]
impl JobQueue for NullJobQueue {
    async fn submit(&self, _job: ProcessingJob) -> Result<()> {
        Ok(())
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub store: Arc<MemoryVideoStore>,
    _tempdir: tempfile::TempDir,
}

fn test_config(base_dir: &str) -> Config {
    Config {
        environment: "test".to_string(),
        server_port: 0,
        database_url: "postgresql://localhost/framevault_test".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_backend: StorageBackend::Local,
        storage_base_dir: base_dir.to_string(),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        // Tight ceiling so oversize behavior is testable with small payloads.
        max_upload_size_bytes: 1024,
        allowed_extensions: ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        allowed_content_types: [
            "video/mp4",
            "video/x-msvideo",
            "video/quicktime",
            "video/x-matroska",
            "video/x-ms-wmv",
            "video/x-flv",
            "video/webm",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        ffmpeg_path: "ffmpeg".to_string(),
        frame_sample_rate_fps: 1,
        sqs_queue_url: None,
        job_queue_size: 16,
        job_max_concurrent: 1,
        auth_issuer: None,
        auth_client_id: None,
        auth_required: false,
    }
}

pub async fn test_state() -> TestEnv {
    let tempdir = tempfile::tempdir().unwrap();
    let base_dir = tempdir.path().to_string_lossy().into_owned();
    let config = test_config(&base_dir);

    let storage = LocalStorage::new(tempdir.path()).await.unwrap();
    let store = Arc::new(MemoryVideoStore::new());
    let validator = UploadValidator::new(
        config.max_upload_size_bytes,
        config.allowed_extensions.clone(),
        config.allowed_content_types.clone(),
    );

    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        storage: Arc::new(storage),
        jobs: Arc::new(NullJobQueue),
        validator: Arc::new(validator),
        verifier: None,
        pool: None,
    };

    TestEnv {
        state,
        store,
        _tempdir: tempdir,
    }
}

pub async fn test_state_with_auth() -> TestEnv {
    let mut env = test_state().await;
    let mut config = (*env.state.config).clone();
    config.auth_issuer = Some("https://issuer.example/pool".to_string());
    config.auth_client_id = Some("client-123".to_string());
    config.auth_required = true;
    env.state.config = Arc::new(config);
    env.state.verifier = Some(Arc::new(JwksVerifier::new(
        "https://issuer.example/pool".to_string(),
        "client-123".to_string(),
        None,
    )));
    env
}
