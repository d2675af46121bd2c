//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use framevault_core::StorageBackend;
use std::path::Path;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All backends name stored objects `{correlation_id}_{filename}` under an
/// `uploads/` prefix, so re-storing the same file under the same correlation
/// id overwrites rather than duplicates.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store raw upload bytes and return the backend-specific location string.
    async fn store(
        &self,
        filename: &str,
        correlation_id: &str,
        data: Vec<u8>,
    ) -> StorageResult<String>;

    /// Store an upload from a reader (for large files). Returns the location string.
    async fn store_stream(
        &self,
        filename: &str,
        correlation_id: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reduce a client-supplied filename to a safe base name.
///
/// Strips path components (`../`, leading directories) so keys can never
/// escape the upload prefix.
pub fn sanitize_filename(filename: &str) -> StorageResult<String> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
        .ok_or_else(|| StorageError::InvalidFilename(filename.to_string()))
}

/// Object name shared by all backends: `{correlation_id}_{filename}`.
pub fn object_name(filename: &str, correlation_id: &str) -> StorageResult<String> {
    let safe = sanitize_filename(filename)?;
    Ok(format!("{}_{}", correlation_id, safe))
}
