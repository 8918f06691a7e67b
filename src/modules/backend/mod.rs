//! Backend-as-a-service boundary.
//!
//! Traits for the account service, document database and object store,
//! the wire query/payload types they share, and the Appwrite-compatible
//! REST implementation.

pub mod appwrite;
pub mod client;
pub mod payload;
pub mod query;

pub use appwrite::AppwriteClient;
pub use client::{
    AccountClient, AccountInfo, DocumentsClient, DocumentList, EmailToken, Session, StorageClient,
    StoredFile,
};
pub use payload::{BufferPayload, PayloadSource, ProgressFn, StreamPayload, UploadProgress};
pub use query::QueryClause;
