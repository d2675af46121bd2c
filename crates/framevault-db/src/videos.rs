//! Video record store
//!
//! The `VideoStore` trait is the seam between the HTTP/worker layers and
//! Postgres; the worker and API tests substitute in-memory implementations.

use async_trait::async_trait;
use framevault_core::{AppError, Video, VideoStatus};
use sqlx::{PgPool, Postgres};

/// Persistence operations for video records.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new record and return it with its database-assigned id.
    async fn create(
        &self,
        user_id: Option<i64>,
        title: &str,
        file_path: &str,
        status: VideoStatus,
    ) -> Result<Video, AppError>;

    /// Update the status (and optionally the file path) of an existing record.
    ///
    /// `file_path = None` leaves the stored path untouched. A missing record
    /// yields `AppError::NotFound`.
    async fn update_status(
        &self,
        video_id: i64,
        status: VideoStatus,
        file_path: Option<&str>,
    ) -> Result<Video, AppError>;

    /// List all videos owned by `user_id`, newest first.
    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Video>, AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: i64,
    user_id: Option<i64>,
    title: Option<String>,
    file_path: Option<String>,
    status: i16,
}

impl TryFrom<VideoRow> for Video {
    type Error = AppError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let status = VideoStatus::try_from(row.status)
            .map_err(|e| AppError::Internal(format!("Corrupt video row {}: {}", row.id, e)))?;
        Ok(Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            file_path: row.file_path,
            status,
        })
    }
}

/// Postgres-backed video store.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map insert failures, surfacing constraint violations as integrity errors.
fn map_insert_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::Integrity(format!("Duplicate video record: {}", db_err.message()));
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn create(
        &self,
        user_id: Option<i64>,
        title: &str,
        file_path: &str,
        status: VideoStatus,
    ) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            INSERT INTO videos (user_id, title, file_path, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, file_path, status
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(file_path)
        .bind(i16::from(status))
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        let video = Video::try_from(row)?;
        tracing::debug!(video_id = video.id, "Video record created");
        Ok(video)
    }

    async fn update_status(
        &self,
        video_id: i64,
        status: VideoStatus,
        file_path: Option<&str>,
    ) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET status = $2,
                file_path = COALESCE($3, file_path),
                updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, file_path, status
            "#,
        )
        .bind(video_id)
        .bind(i16::from(status))
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        Video::try_from(row)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            SELECT id, user_id, title, file_path, status
            FROM videos
            WHERE user_id = $1
            ORDER BY id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(Video::try_from).collect()
    }
}
