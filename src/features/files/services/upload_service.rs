use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::config::{BackendConfig, StorageConfig};
use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileCategory, FileRecord};
use crate::features::files::services::upload_tracker::{UploadStatus, UploadTask, UploadTracker};
use crate::features::users::services::IdentityService;
use crate::modules::backend::client::{DocumentsClient, StorageClient};
use crate::modules::backend::payload::PayloadSource;
use crate::shared::constants::UPLOAD_REMOVAL_DELAY_MS;

/// Orchestrates the multi-step upload protocol:
/// verify session, upload the blob, derive metadata, register the
/// catalog record, and keep the progress tracker in sync throughout.
///
/// Catalog identity must resolve before anything is uploaded; there is
/// no fallback to the raw account identifier.
pub struct UploadService {
    backend_config: BackendConfig,
    storage_config: StorageConfig,
    identity: Arc<IdentityService>,
    documents: Arc<dyn DocumentsClient>,
    storage: Arc<dyn StorageClient>,
    tracker: Arc<UploadTracker>,
}

impl UploadService {
    pub fn new(
        backend_config: BackendConfig,
        storage_config: StorageConfig,
        identity: Arc<IdentityService>,
        documents: Arc<dyn DocumentsClient>,
        storage: Arc<dyn StorageClient>,
        tracker: Arc<UploadTracker>,
    ) -> Self {
        Self {
            backend_config,
            storage_config,
            identity,
            documents,
            storage,
            tracker,
        }
    }

    /// Upload one file and register its catalog record.
    ///
    /// The session check happens before the task appears in the tracker.
    /// On failure after registration the task's progress is forced to
    /// 100 (clearing any indeterminate UI state), the task is removed
    /// immediately and the error propagates. A blob uploaded before a
    /// failed record creation is not rolled back; that orphan is a
    /// reconciliation concern, never masked as success.
    pub async fn upload_file(&self, payload: PayloadSource) -> Result<FileRecord> {
        // Step 1: identity first; nothing is tracked for an
        // unauthenticated caller
        let user = self.identity.resolve_current_user().await.map_err(|e| {
            error!("Upload rejected: {}", e);
            match e {
                AppError::AuthenticationRequired(_) => AppError::AuthenticationRequired(
                    "You must be logged in to upload files".to_string(),
                ),
                other => other,
            }
        })?;

        let task_id = Uuid::new_v4().simple().to_string();
        self.tracker.add(UploadTask {
            id: task_id.clone(),
            name: payload.name().to_string(),
            size: payload.size(),
            progress: 0,
            status: UploadStatus::Uploading,
        });

        match self.run_upload(&task_id, &user.id, &user.account_id, payload).await {
            Ok(record) => {
                self.tracker.mark_complete(&task_id);
                self.tracker
                    .schedule_removal(&task_id, Duration::from_millis(UPLOAD_REMOVAL_DELAY_MS));
                info!("Upload '{}' completed as file '{}'", task_id, record.id);
                Ok(record)
            }
            Err(e) => {
                self.tracker.update_progress(&task_id, 100);
                self.tracker.remove(&task_id);
                error!("Upload '{}' failed: {}", task_id, e);
                Err(e)
            }
        }
    }

    /// Fire all uploads concurrently and report per-file outcomes.
    /// One failed upload never cancels its siblings.
    pub async fn upload_multiple(&self, payloads: Vec<PayloadSource>) -> Vec<Result<FileRecord>> {
        join_all(payloads.into_iter().map(|p| self.upload_file(p))).await
    }

    async fn run_upload(
        &self,
        task_id: &str,
        owner_id: &str,
        account_id: &str,
        payload: PayloadSource,
    ) -> Result<FileRecord> {
        let bucket_id = &self.storage_config.bucket_id;
        let blob_id = Uuid::new_v4().simple().to_string();

        let tracker = Arc::clone(&self.tracker);
        let progress_task_id = task_id.to_string();
        let uploaded = self
            .storage
            .create_file(
                bucket_id,
                &blob_id,
                &payload,
                Some(Box::new(move |progress| {
                    tracker.update_progress(&progress_task_id, progress.percent());
                })),
            )
            .await?;

        let url = self.storage.get_file_view(bucket_id, &uploaded.id);
        let category = FileCategory::from_mime(payload.mime_type());
        debug!(
            "Blob '{}' stored for upload '{}' (category: {})",
            uploaded.id, task_id, category
        );

        let document = self
            .documents
            .create_document(
                &self.backend_config.database_id,
                &self.backend_config.files_collection_id,
                &Uuid::new_v4().simple().to_string(),
                json!({
                    "name": payload.name(),
                    "url": url,
                    "type": category,
                    "extension": payload.extension(),
                    "size": payload.size(),
                    "bucketField": bucket_id,
                    "accountId": account_id,
                    "owner": owner_id,
                    "users": [owner_id],
                }),
            )
            .await?;

        Ok(serde_json::from_value(document)?)
    }
}
