//! Framevault Storage Library
//!
//! Storage abstraction for raw video uploads. Backends write objects named
//! `{correlation_id}_{filename}` under an `uploads/` prefix and return a
//! backend-specific location string (a filesystem path for local storage, an
//! `s3://` URI for S3).

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use framevault_core::StorageBackend;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
