//! Storify catalog core.
//!
//! Access-control, query construction and upload orchestration for the
//! Storify file-storage client, over an Appwrite-compatible backend.
//! The embedding UI builds one [`AppContext`] and drives the services;
//! all backend collaborators sit behind traits so platforms and tests
//! can swap transports.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;

pub use crate::core::app::AppContext;
pub use crate::core::config::Config;
pub use crate::core::error::{AppError, Result};
pub use crate::features::auth::AuthService;
pub use crate::features::files::{
    build_query, CollectionScope, FileCatalogService, FileCategory, FileRecord, QuerySpec, Sort,
    SortDirection, UploadService, UploadStatus, UploadTask, UploadTracker, UsageSummary,
};
pub use crate::features::users::{CatalogUser, IdentityService};
pub use crate::modules::backend::{PayloadSource, QueryClause};
