//! Backend service boundary.
//!
//! The account service, document database and object store are external
//! collaborators. Services take them as trait objects so the concrete
//! transport is wired once at the composition root and tests can inject
//! in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::Result;
use crate::modules::backend::payload::{PayloadSource, ProgressFn};
use crate::modules::backend::query::QueryClause;

/// Authenticated account as reported by the account service
#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub account_id: String,
    pub email: String,
}

/// One-time-passcode token issued for email verification
#[derive(Debug, Clone)]
pub struct EmailToken {
    pub user_id: String,
}

/// An established session with the account service
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub secret: String,
}

/// Result page from a document list query
#[derive(Debug, Clone)]
pub struct DocumentList {
    pub total: i64,
    pub documents: Vec<Value>,
}

/// Handle to an uploaded blob
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
}

/// Account and session management
#[async_trait]
pub trait AccountClient: Send + Sync {
    /// Return the account behind the active session.
    /// Fails with `AuthenticationRequired` when no valid session exists.
    async fn get_session(&self) -> Result<AccountInfo>;

    /// Send a one-time passcode to the given email
    async fn create_email_token(&self, user_id: &str, email: &str) -> Result<EmailToken>;

    /// Exchange a passcode for a session
    async fn create_session(&self, account_id: &str, secret: &str) -> Result<Session>;

    /// Terminate a session (`"current"` for the active one)
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Install the session secret used for subsequent requests
    fn set_session(&self, secret: &str);

    /// Drop the installed session secret
    fn clear_session(&self);
}

/// Document database CRUD
#[async_trait]
pub trait DocumentsClient: Send + Sync {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[QueryClause],
    ) -> Result<DocumentList>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value>;

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()>;
}

/// Object store blob operations
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload a payload under the given id.
    ///
    /// Buffer payloads complete atomically; stream payloads report
    /// incremental progress through `on_progress` as chunks land.
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        payload: &PayloadSource,
        on_progress: Option<ProgressFn>,
    ) -> Result<StoredFile>;

    /// Retrievable view URL for a stored blob
    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> String;

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()>;
}
