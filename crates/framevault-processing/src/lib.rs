//! Framevault Processing Library
//!
//! Upload validation and frame extraction. Validation runs on the request
//! path; extraction shells out to ffmpeg on the worker side and packages the
//! resulting frames into a ZIP archive.

pub mod extractor;
pub mod validator;

pub use extractor::{ExtractError, Extraction, FfmpegFrameExtractor, FrameExtractor};
pub use validator::{UploadValidator, ValidationError};
