//! Upload validation
//!
//! Validates filename extension, declared content type, and byte size before
//! any side effect happens on the upload path.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes exceeds max {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid extension '{extension}', allowed: {allowed:?}")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type '{content_type}', allowed: {allowed:?}")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Missing file extension (filename: {0})")]
    MissingExtension(String),

    #[error("File is empty")]
    EmptyFile,
}

/// Validates uploads against configured limits and allow-lists.
#[derive(Clone, Debug)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Validate the filename extension against the allow-list (case-insensitive).
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate the declared content type against the allow-list.
    ///
    /// Parameters after `;` are stripped before comparison, so
    /// `video/mp4; charset=binary` passes when `video/mp4` is allowed.
    /// A missing or empty declaration is rejected.
    pub fn validate_content_type(
        &self,
        content_type: Option<&str>,
    ) -> Result<(), ValidationError> {
        let declared = content_type.unwrap_or("").trim();
        let media_type = declared
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        if media_type.is_empty() || !self.allowed_content_types.contains(&media_type) {
            return Err(ValidationError::InvalidContentType {
                content_type: declared.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate the upload size against the configured ceiling.
    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Run all checks; the first failure wins.
    pub fn validate(
        &self,
        filename: &str,
        content_type: Option<&str>,
        size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_size(size)?;
        Ok(())
    }
}
