use crate::traits::{object_name, Storage, StorageError, StorageResult};
use framevault_core::StorageBackend;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Local filesystem storage implementation
///
/// Keeps the working layout under a single base directory: `uploads/` for raw
/// videos, `outputs/` for frame archives, `temp/` for extraction scratch space.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`.
    ///
    /// The `uploads/`, `outputs/`, and `temp/` subdirectories are created
    /// idempotently so construction can run on every startup.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        for dir in ["uploads", "outputs", "temp"] {
            let path = base_path.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage { base_path })
    }

    fn upload_path(&self, name: &str) -> PathBuf {
        self.base_path.join("uploads").join(name)
    }
}

#[async_trait::async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        filename: &str,
        correlation_id: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let name = object_name(filename, correlation_id)?;
        let path = self.upload_path(&name);
        let size = data.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(path.to_string_lossy().into_owned())
    }

    async fn store_stream(
        &self,
        filename: &str,
        correlation_id: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let name = object_name(filename, correlation_id)?;
        let path = self.upload_path(&name);
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(path.to_string_lossy().into_owned())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_new_creates_working_directories() {
        let dir = tempdir().unwrap();
        LocalStorage::new(dir.path()).await.unwrap();

        for sub in ["uploads", "outputs", "temp"] {
            assert!(dir.path().join(sub).is_dir());
        }

        // Second construction over the same directory must not fail.
        LocalStorage::new(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_writes_under_uploads() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"fake video bytes".to_vec();
        let location = storage
            .store("clip.mp4", "20240101_120000", data.clone())
            .await
            .unwrap();

        let expected = dir.path().join("uploads").join("20240101_120000_clip.mp4");
        assert_eq!(location, expected.to_string_lossy());
        assert_eq!(tokio::fs::read(&expected).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_store_strips_path_traversal() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let location = storage
            .store("../../escape.mp4", "20240101_120000", b"x".to_vec())
            .await
            .unwrap();

        assert!(location.ends_with("uploads/20240101_120000_escape.mp4"));
        assert!(dir
            .path()
            .join("uploads")
            .join("20240101_120000_escape.mp4")
            .exists());
    }

    #[tokio::test]
    async fn test_store_stream() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let data = b"streamed bytes".to_vec();
        let cursor = std::io::Cursor::new(data.clone());
        let reader = Box::pin(cursor) as Pin<Box<dyn AsyncRead + Send + Unpin>>;

        let location = storage
            .store_stream("clip.mp4", "20240101_120000", reader)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&location).await.unwrap(), data);
    }
}
