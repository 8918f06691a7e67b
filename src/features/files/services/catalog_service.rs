use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::core::config::{BackendConfig, StorageConfig};
use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, UsageSummary};
use crate::features::files::query::{build_query, CollectionScope, QuerySpec, Sort};
use crate::features::users::models::CatalogUser;
use crate::features::users::services::IdentityService;
use crate::modules::backend::client::{DocumentsClient, StorageClient};

/// CRUD and share/unshare operations over file records.
///
/// Every operation resolves the caller's identity fresh and checks
/// ownership against the current resolved identity, never a cached one.
/// Sharing grants read visibility only; all mutations are owner-only.
pub struct FileCatalogService {
    backend_config: BackendConfig,
    storage_config: StorageConfig,
    documents: Arc<dyn DocumentsClient>,
    storage: Arc<dyn StorageClient>,
    identity: Arc<IdentityService>,
}

impl FileCatalogService {
    pub fn new(
        backend_config: BackendConfig,
        storage_config: StorageConfig,
        documents: Arc<dyn DocumentsClient>,
        storage: Arc<dyn StorageClient>,
        identity: Arc<IdentityService>,
    ) -> Self {
        Self {
            backend_config,
            storage_config,
            documents,
            storage,
            identity,
        }
    }

    /// Execute a prepared query spec against the file collection.
    /// Zero results is a valid outcome, not an error.
    pub async fn list_files(&self, query: &QuerySpec) -> Result<Vec<FileRecord>> {
        let result = self
            .documents
            .list_documents(
                &self.backend_config.database_id,
                &self.backend_config.files_collection_id,
                query,
            )
            .await?;

        result
            .documents
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    /// List the files visible to the current user in the given view
    pub async fn get_files(
        &self,
        scope: CollectionScope,
        search: Option<&str>,
        sort: Option<&Sort>,
    ) -> Result<Vec<FileRecord>> {
        let user = self.identity.resolve_current_user().await?;
        let query = build_query(&user, scope, search, sort);
        self.list_files(&query).await
    }

    /// Aggregate storage usage across everything visible to the user.
    ///
    /// Video and audio are reported separately; presentation layers fold
    /// them together via `UsageSummary::merged_media`.
    pub async fn get_aggregate_usage(&self) -> Result<UsageSummary> {
        let user = self.identity.resolve_current_user().await?;
        let query = build_query(&user, CollectionScope::Dashboard, None, None);
        let files = self.list_files(&query).await?;

        let mut summary = UsageSummary::new(self.storage_config.total_capacity_bytes);
        for file in &files {
            summary.record(file.category, file.size, file.created_at);
        }

        debug!(
            "Aggregated usage for '{}': {} bytes across {} files",
            user.id,
            summary.total_used,
            files.len()
        );
        Ok(summary)
    }

    /// Rename a file. Owner-only.
    pub async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<FileRecord> {
        let user = self.identity.resolve_current_user().await?;
        let record = self.load_record(file_id).await?;
        Self::check_ownership(&record, &user)?;

        let updated = self
            .update_record(file_id, json!({ "name": new_name }))
            .await?;

        info!("Renamed file '{}' to '{}'", file_id, new_name);
        Ok(updated)
    }

    /// Delete a file record and its blob. Owner-only.
    ///
    /// The catalog record is deleted first, the blob second: a leaked
    /// blob is preferred over a dangling record pointing at a missing
    /// blob. If the blob delete fails the record is already gone; the
    /// error is surfaced and the blob is left for reconciliation.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let user = self.identity.resolve_current_user().await?;
        let record = self.load_record(file_id).await?;
        Self::check_ownership(&record, &user)?;

        self.documents
            .delete_document(
                &self.backend_config.database_id,
                &self.backend_config.files_collection_id,
                file_id,
            )
            .await?;

        match record.blob_id() {
            Some(blob_id) => {
                self.storage
                    .delete_file(&record.bucket_field, &blob_id)
                    .await?;
            }
            None => {
                warn!(
                    "File '{}' has no parseable blob id in url '{}'; blob left in place",
                    file_id, record.url
                );
            }
        }

        info!("Deleted file '{}' ({})", file_id, record.name);
        Ok(())
    }

    /// Share a file with the users behind the given emails. Owner-only.
    ///
    /// Emails with no matching catalog user are silently dropped; zero
    /// resolved recipients is an error. Resolved identifiers merge into
    /// the existing sharing set (union, deduplicated).
    pub async fn share_file(&self, file_id: &str, emails: &[String]) -> Result<FileRecord> {
        let user = self.identity.resolve_current_user().await?;
        let record = self.load_record(file_id).await?;
        Self::check_ownership(&record, &user)?;

        let mut recipients = Vec::new();
        for email in emails {
            match self.identity.find_user_by_email(email).await? {
                Some(recipient) => recipients.push(recipient.id),
                None => debug!("Dropping share recipient '{}': no such user", email),
            }
        }

        if recipients.is_empty() {
            return Err(AppError::NoValidRecipients(
                "None of the given emails matched a user".to_string(),
            ));
        }

        let mut users = record.users.clone();
        for recipient in recipients {
            if !users.contains(&recipient) {
                users.push(recipient);
            }
        }

        let updated = self.update_record(file_id, json!({ "users": users })).await?;
        info!(
            "Shared file '{}' with {} users",
            file_id,
            updated.users.len()
        );
        Ok(updated)
    }

    /// Remove the given user identifiers from a file's sharing set.
    /// Owner-only; removing an absent member is a no-op, and an empty
    /// resulting set is persisted as-is.
    pub async fn unshare_file(&self, file_id: &str, user_ids: &[String]) -> Result<FileRecord> {
        let user = self.identity.resolve_current_user().await?;
        let record = self.load_record(file_id).await?;
        Self::check_ownership(&record, &user)?;

        let users: Vec<String> = record
            .users
            .iter()
            .filter(|id| !user_ids.contains(id))
            .cloned()
            .collect();

        let updated = self.update_record(file_id, json!({ "users": users })).await?;
        info!(
            "Unshared file '{}'; {} users remain",
            file_id,
            updated.users.len()
        );
        Ok(updated)
    }

    async fn load_record(&self, file_id: &str) -> Result<FileRecord> {
        let document = self
            .documents
            .get_document(
                &self.backend_config.database_id,
                &self.backend_config.files_collection_id,
                file_id,
            )
            .await?;

        Ok(serde_json::from_value(document)?)
    }

    async fn update_record(&self, file_id: &str, data: serde_json::Value) -> Result<FileRecord> {
        let document = self
            .documents
            .update_document(
                &self.backend_config.database_id,
                &self.backend_config.files_collection_id,
                file_id,
                data,
            )
            .await?;

        Ok(serde_json::from_value(document)?)
    }

    fn check_ownership(record: &FileRecord, user: &CatalogUser) -> Result<()> {
        if record.owner != user.id {
            return Err(AppError::PermissionDenied(format!(
                "User '{}' does not own file '{}'",
                user.id, record.id
            )));
        }
        Ok(())
    }
}
