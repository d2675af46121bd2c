mod upload;

pub use upload::UploadService;
