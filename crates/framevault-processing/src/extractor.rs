//! Frame extraction
//!
//! Shells out to ffmpeg to sample frames from a video at a fixed rate, then
//! packages the frames into a flat ZIP archive under `outputs/`. Scratch
//! space lives under `temp/{correlation_id}` and is removed on every exit
//! path (best-effort on success).

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("ffmpeg failed with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    #[error("No frames extracted from video")]
    NoFrames,

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub archive_path: String,
    pub frame_count: usize,
    pub frame_names: Vec<String>,
}

/// Frame extraction seam; the worker tests substitute a scripted implementation.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract(
        &self,
        video_location: &str,
        correlation_id: &str,
    ) -> Result<Extraction, ExtractError>;
}

/// ffmpeg-backed extractor.
pub struct FfmpegFrameExtractor {
    base_dir: PathBuf,
    ffmpeg_path: String,
    sample_rate_fps: u32,
}

impl FfmpegFrameExtractor {
    pub fn new(base_dir: impl Into<PathBuf>, ffmpeg_path: String, sample_rate_fps: u32) -> Self {
        Self {
            base_dir: base_dir.into(),
            ffmpeg_path,
            sample_rate_fps: sample_rate_fps.max(1),
        }
    }

    async fn cleanup_scratch(scratch: &Path) {
        if let Err(e) = fs::remove_dir_all(scratch).await {
            tracing::warn!(
                path = %scratch.display(),
                error = %e,
                "Failed to remove extraction scratch directory"
            );
        }
    }

    /// Collect extracted frame file names, sorted for deterministic ordering.
    async fn collect_frames(scratch: &Path) -> Result<Vec<String>, ExtractError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(scratch).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Build a flat ZIP archive (base names only) from the frame files.
    async fn build_archive(
        scratch: &Path,
        frame_names: &[String],
        archive_path: &Path,
    ) -> Result<(), ExtractError> {
        use zip::write::{FileOptions, ZipWriter};
        use zip::CompressionMethod;

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for name in frame_names {
                let data = fs::read(scratch.join(name)).await?;
                zip.start_file(name, options)
                    .map_err(|e| ExtractError::Archive(e.to_string()))?;
                zip.write_all(&data)
                    .map_err(|e| ExtractError::Archive(e.to_string()))?;
            }

            zip.finish()
                .map_err(|e| ExtractError::Archive(e.to_string()))?;
        }

        fs::write(archive_path, buffer).await?;
        Ok(())
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract(
        &self,
        video_location: &str,
        correlation_id: &str,
    ) -> Result<Extraction, ExtractError> {
        let scratch = self.base_dir.join("temp").join(correlation_id);
        fs::create_dir_all(&scratch).await?;

        let pattern = scratch.join("frame_%04d.png");
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(video_location)
            .arg("-vf")
            .arg(format!("fps={}", self.sample_rate_fps))
            .arg(&pattern)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let status = output.status.code().unwrap_or(-1);
            Self::cleanup_scratch(&scratch).await;
            tracing::error!(
                correlation_id = %correlation_id,
                status = status,
                duration_ms = start.elapsed().as_millis() as u64,
                "ffmpeg frame extraction failed"
            );
            return Err(ExtractError::CommandFailed { status, stderr });
        }

        let frame_names = match Self::collect_frames(&scratch).await {
            Ok(names) => names,
            Err(e) => {
                Self::cleanup_scratch(&scratch).await;
                return Err(e);
            }
        };

        if frame_names.is_empty() {
            Self::cleanup_scratch(&scratch).await;
            return Err(ExtractError::NoFrames);
        }

        let outputs = self.base_dir.join("outputs");
        fs::create_dir_all(&outputs).await?;
        let archive_path = outputs.join(format!("frames_{}.zip", correlation_id));

        if let Err(e) = Self::build_archive(&scratch, &frame_names, &archive_path).await {
            Self::cleanup_scratch(&scratch).await;
            return Err(e);
        }

        Self::cleanup_scratch(&scratch).await;

        tracing::info!(
            correlation_id = %correlation_id,
            frame_count = frame_names.len(),
            archive = %archive_path.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Frame extraction completed"
        );

        Ok(Extraction {
            archive_path: archive_path.to_string_lossy().into_owned(),
            frame_count: frame_names.len(),
            frame_names,
        })
    }
}
