mod catalog_service;
mod upload_service;
pub mod upload_tracker;

pub use catalog_service::FileCatalogService;
pub use upload_service::UploadService;
pub use upload_tracker::{UploadStatus, UploadTask, UploadTracker};
