pub mod models;
pub mod query;
pub mod services;

pub use models::{CategorySummary, CategoryUsage, FileCategory, FileRecord, UsageSummary};
pub use query::{build_query, CollectionScope, QuerySpec, Sort, SortDirection};
pub use services::{FileCatalogService, UploadService, UploadStatus, UploadTask, UploadTracker};
