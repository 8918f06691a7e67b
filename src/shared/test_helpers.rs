//! In-memory backend fakes for service tests.
//!
//! `InMemoryBackend` implements the account, document and storage
//! boundaries over hash maps, evaluates query clauses the way the
//! document store would, and supports one-shot failure injection.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::config::{BackendConfig, StorageConfig};
use crate::core::error::{AppError, Result};
use crate::features::files::models::FileCategory;
use crate::modules::backend::client::{
    AccountClient, AccountInfo, DocumentsClient, DocumentList, EmailToken, Session, StorageClient,
    StoredFile,
};
use crate::modules::backend::payload::{PayloadSource, ProgressFn, UploadProgress};
use crate::modules::backend::query::QueryClause;

pub fn test_backend_config() -> BackendConfig {
    BackendConfig {
        endpoint: "https://backend.test/v1".to_string(),
        project_id: "test-project".to_string(),
        database_id: "db-1".to_string(),
        files_collection_id: "files".to_string(),
        users_collection_id: "users".to_string(),
    }
}

pub fn test_storage_config() -> StorageConfig {
    StorageConfig {
        bucket_id: "bucket-1".to_string(),
        total_capacity_bytes: 2 * 1024 * 1024 * 1024,
    }
}

#[derive(Default)]
pub struct InMemoryBackend {
    session: RwLock<Option<AccountInfo>>,
    session_secret: RwLock<Option<String>>,
    /// collection id -> documents
    collections: Mutex<HashMap<String, Vec<Value>>>,
    /// blob id -> size
    blobs: Mutex<HashMap<String, u64>>,
    /// Percentages reported through upload progress callbacks
    progress: Mutex<Vec<u8>>,
    /// Mutating backend calls in arrival order
    op_log: Mutex<Vec<String>>,
    fail_next_document_create: AtomicBool,
    fail_next_blob_delete: AtomicBool,
    fail_next_upload: AtomicBool,
    fail_create_for_name: Mutex<Option<String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_session(&self, account_id: &str, email: &str) {
        *self.session.write().unwrap() = Some(AccountInfo {
            account_id: account_id.to_string(),
            email: email.to_string(),
        });
    }

    pub fn seed_user(&self, id: &str, account_id: &str, full_name: &str, email: &str) {
        self.insert_document(
            "users",
            json!({
                "$id": id,
                "$createdAt": Utc::now().to_rfc3339(),
                "fullName": full_name,
                "email": email,
                "avatar": "",
                "accountId": account_id,
            }),
        );
    }

    pub fn seed_file(&self, id: &str, name: &str, owner: &str, category: FileCategory, size: u64) {
        self.seed_file_with_users(id, name, owner, category, size, &[owner]);
    }

    pub fn seed_file_with_users(
        &self,
        id: &str,
        name: &str,
        owner: &str,
        category: FileCategory,
        size: u64,
        users: &[&str],
    ) {
        let blob_id = format!("blob-{}", id);
        self.blobs.lock().unwrap().insert(blob_id.clone(), size);
        self.insert_document(
            "files",
            json!({
                "$id": id,
                "$createdAt": Utc::now().to_rfc3339(),
                "name": name,
                "url": self.get_file_view("bucket-1", &blob_id),
                "type": category.as_str(),
                "extension": name.rsplit('.').next().unwrap_or_default(),
                "size": size,
                "bucketField": "bucket-1",
                "accountId": format!("acct-{}", owner),
                "owner": owner,
                "users": users,
            }),
        );
    }

    pub fn fail_next_document_create(&self) {
        self.fail_next_document_create
            .store(true, AtomicOrdering::SeqCst);
    }

    pub fn fail_document_create_for_name(&self, name: &str) {
        *self.fail_create_for_name.lock().unwrap() = Some(name.to_string());
    }

    pub fn fail_next_blob_delete(&self) {
        self.fail_next_blob_delete
            .store(true, AtomicOrdering::SeqCst);
    }

    pub fn fail_next_upload(&self) {
        self.fail_next_upload.store(true, AtomicOrdering::SeqCst);
    }

    pub fn document_exists(&self, id: &str) -> Option<Value> {
        self.collections
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|doc| doc["$id"] == id)
            .cloned()
    }

    pub fn blob_exists(&self, id: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(id)
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn file_document_count(&self) -> usize {
        self.collection_len("files")
    }

    pub fn user_document_count(&self) -> usize {
        self.collection_len("users")
    }

    pub fn operation_log(&self) -> Vec<String> {
        self.op_log.lock().unwrap().clone()
    }

    pub fn progress_reports(&self) -> Vec<u8> {
        self.progress.lock().unwrap().clone()
    }

    pub fn installed_session_secret(&self) -> Option<String> {
        self.session_secret.read().unwrap().clone()
    }

    fn collection_len(&self, collection_id: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection_id)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn insert_document(&self, collection_id: &str, doc: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection_id.to_string())
            .or_default()
            .push(doc);
    }

    fn log(&self, op: String) {
        self.op_log.lock().unwrap().push(op);
    }

    fn report_progress(&self, on_progress: Option<&ProgressFn>, loaded: u64, total: u64) {
        let event = UploadProgress { loaded, total };
        self.progress.lock().unwrap().push(event.percent());
        if let Some(callback) = on_progress {
            callback(event);
        }
    }

    fn matches(doc: &Value, clause: &QueryClause) -> bool {
        match clause {
            QueryClause::Equal(attr, values) => match doc.get(attr) {
                Some(Value::String(s)) => values.iter().any(|v| v == s),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .any(|s| values.iter().any(|v| v == s)),
                Some(other) => values.iter().any(|v| *v == other.to_string()),
                None => false,
            },
            QueryClause::Contains(attr, values) => match doc.get(attr) {
                Some(Value::String(s)) => values.iter().any(|v| s.contains(v.as_str())),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .any(|s| values.iter().any(|v| v == s)),
                _ => false,
            },
            QueryClause::And(clauses) => clauses.iter().all(|c| Self::matches(doc, c)),
            QueryClause::Or(clauses) => clauses.iter().any(|c| Self::matches(doc, c)),
            QueryClause::OrderAsc(_) | QueryClause::OrderDesc(_) => true,
        }
    }

    fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
        let left = a.get(field);
        let right = b.get(field);
        match (left, right) {
            (Some(Value::Number(x)), Some(Value::Number(y))) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

#[async_trait]
impl AccountClient for InMemoryBackend {
    async fn get_session(&self) -> Result<AccountInfo> {
        self.session
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::AuthenticationRequired("No active session".to_string()))
    }

    async fn create_email_token(&self, user_id: &str, _email: &str) -> Result<EmailToken> {
        Ok(EmailToken {
            user_id: user_id.to_string(),
        })
    }

    async fn create_session(&self, account_id: &str, _secret: &str) -> Result<Session> {
        let email = self
            .collections
            .lock()
            .unwrap()
            .get("users")
            .and_then(|docs| {
                docs.iter()
                    .find(|d| d["accountId"] == account_id)
                    .and_then(|d| d["email"].as_str().map(String::from))
            })
            .unwrap_or_default();

        self.open_session(account_id, &email);
        Ok(Session {
            session_id: Uuid::new_v4().simple().to_string(),
            secret: Uuid::new_v4().simple().to_string(),
        })
    }

    async fn delete_session(&self, _session_id: &str) -> Result<()> {
        let mut session = self.session.write().unwrap();
        if session.is_none() {
            return Err(AppError::AuthenticationRequired(
                "No active session".to_string(),
            ));
        }
        *session = None;
        Ok(())
    }

    fn set_session(&self, secret: &str) {
        *self.session_secret.write().unwrap() = Some(secret.to_string());
    }

    fn clear_session(&self) {
        *self.session_secret.write().unwrap() = None;
    }
}

#[async_trait]
impl DocumentsClient for InMemoryBackend {
    async fn list_documents(
        &self,
        _database_id: &str,
        collection_id: &str,
        queries: &[QueryClause],
    ) -> Result<DocumentList> {
        let collections = self.collections.lock().unwrap();
        let mut documents: Vec<Value> = collections
            .get(collection_id)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| queries.iter().all(|q| Self::matches(doc, q)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for query in queries {
            match query {
                QueryClause::OrderAsc(field) => {
                    documents.sort_by(|a, b| Self::compare_field(a, b, field));
                }
                QueryClause::OrderDesc(field) => {
                    documents.sort_by(|a, b| Self::compare_field(b, a, field));
                }
                _ => {}
            }
        }

        Ok(DocumentList {
            total: documents.len() as i64,
            documents,
        })
    }

    async fn get_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection_id)
            .and_then(|docs| docs.iter().find(|d| d["$id"] == document_id).cloned())
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))
    }

    async fn create_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        if self
            .fail_next_document_create
            .swap(false, AtomicOrdering::SeqCst)
        {
            return Err(AppError::BackendUnavailable(
                "Injected document create failure".to_string(),
            ));
        }
        if let Some(name) = self.fail_create_for_name.lock().unwrap().as_deref() {
            if data["name"] == name {
                return Err(AppError::BackendUnavailable(
                    "Injected document create failure".to_string(),
                ));
            }
        }

        let mut doc = json!({
            "$id": document_id,
            "$createdAt": Utc::now().to_rfc3339(),
        });
        if let (Some(target), Some(source)) = (doc.as_object_mut(), data.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }

        self.insert_document(collection_id, doc.clone());
        self.log(format!("create_document:{}", document_id));
        Ok(doc)
    }

    async fn update_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection_id)
            .and_then(|docs| docs.iter_mut().find(|d| d["$id"] == document_id))
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))?;

        if let (Some(target), Some(source)) = (doc.as_object_mut(), data.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }

        Ok(doc.clone())
    }

    async fn delete_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let mut collections = self.collections.lock().unwrap();
        let docs = collections
            .get_mut(collection_id)
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))?;

        let before = docs.len();
        docs.retain(|d| d["$id"] != document_id);
        if docs.len() == before {
            return Err(AppError::NotFound(format!(
                "Document '{}' not found",
                document_id
            )));
        }

        drop(collections);
        self.log(format!("delete_document:{}", document_id));
        Ok(())
    }
}

#[async_trait]
impl StorageClient for InMemoryBackend {
    async fn create_file(
        &self,
        _bucket_id: &str,
        file_id: &str,
        payload: &PayloadSource,
        on_progress: Option<ProgressFn>,
    ) -> Result<StoredFile> {
        if self.fail_next_upload.swap(false, AtomicOrdering::SeqCst) {
            return Err(AppError::BackendUnavailable(
                "Injected upload failure".to_string(),
            ));
        }

        let total = payload.size();
        match payload {
            // Atomic transport: completion reported in one step
            PayloadSource::Buffer(_) => {
                self.report_progress(on_progress.as_ref(), total, total);
            }
            // Chunked transport: three progress callbacks
            PayloadSource::Stream(_) => {
                self.report_progress(on_progress.as_ref(), total / 3, total);
                self.report_progress(on_progress.as_ref(), total * 2 / 3, total);
                self.report_progress(on_progress.as_ref(), total, total);
            }
        }

        self.blobs.lock().unwrap().insert(file_id.to_string(), total);
        self.log(format!("create_file:{}", file_id));
        Ok(StoredFile {
            id: file_id.to_string(),
        })
    }

    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> String {
        format!(
            "https://backend.test/v1/storage/buckets/{}/files/{}/view?project=test-project",
            bucket_id, file_id
        )
    }

    async fn delete_file(&self, _bucket_id: &str, file_id: &str) -> Result<()> {
        if self
            .fail_next_blob_delete
            .swap(false, AtomicOrdering::SeqCst)
        {
            return Err(AppError::BackendUnavailable(
                "Injected blob delete failure".to_string(),
            ));
        }

        self.blobs.lock().unwrap().remove(file_id);
        self.log(format!("delete_file:{}", file_id));
        Ok(())
    }
}
