//! Appwrite-compatible REST client.
//!
//! Implements the account, document database and object store boundaries
//! against an Appwrite-shaped backend. The session secret is installed on
//! the shared client after OTP verification and sent with every request.

use std::sync::RwLock;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use async_trait::async_trait;

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::modules::backend::client::{
    AccountClient, AccountInfo, DocumentsClient, DocumentList, EmailToken, Session, StorageClient,
    StoredFile,
};
use crate::modules::backend::payload::{PayloadSource, ProgressFn, UploadProgress};
use crate::modules::backend::query::QueryClause;
use crate::shared::constants::UPLOAD_CHUNK_SIZE;

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    secret: String,
}

#[derive(Debug, Deserialize)]
struct DocumentListResponse {
    total: i64,
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(rename = "$id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct BackendErrorResponse {
    #[serde(default)]
    message: String,
}

/// REST client for the Appwrite-compatible backend
pub struct AppwriteClient {
    config: BackendConfig,
    http_client: Client,
    /// Session secret installed after OTP verification
    session_secret: RwLock<Option<String>>,
}

impl AppwriteClient {
    pub fn new(config: BackendConfig) -> Self {
        info!(
            "Backend client initialized for endpoint: {}, project: {}",
            config.endpoint, config.project_id
        );
        Self {
            config,
            http_client: Client::new(),
            session_secret: RwLock::new(None),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.endpoint, path);
        let mut builder = self
            .http_client
            .request(method, &url)
            .header("X-Appwrite-Project", &self.config.project_id);

        let secret = self
            .session_secret
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        if let Some(secret) = secret {
            builder = builder.header("X-Appwrite-Session", secret);
        }

        builder
    }

    /// Map a non-success response to the error taxonomy
    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<BackendErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.clone());

        match status {
            StatusCode::UNAUTHORIZED => AppError::AuthenticationRequired(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => {
                error!("Backend API error: HTTP {} - {}", status, message);
                AppError::BackendUnavailable(format!("HTTP {}: {}", status, message))
            }
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    fn multipart_form(file_id: &str, name: &str, mime_type: &str, data: Vec<u8>) -> Result<Form> {
        let part = Part::bytes(data)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| AppError::Validation(format!("Invalid MIME type '{}': {}", mime_type, e)))?;

        Ok(Form::new().text("fileId", file_id.to_string()).part("file", part))
    }

    /// Upload a whole in-memory payload in one request
    async fn upload_buffer(
        &self,
        bucket_id: &str,
        file_id: &str,
        name: &str,
        mime_type: &str,
        data: Vec<u8>,
        on_progress: Option<&ProgressFn>,
    ) -> Result<StoredFile> {
        let total = data.len() as u64;
        let form = Self::multipart_form(file_id, name, mime_type, data)?;

        let uploaded: FileResponse = Self::send_json(
            self.request(
                Method::POST,
                &format!("/storage/buckets/{}/files", bucket_id),
            )
            .multipart(form),
        )
        .await?;

        // Atomic transport: report completion in one step
        if let Some(callback) = on_progress {
            callback(UploadProgress {
                loaded: total,
                total,
            });
        }

        debug!("Uploaded blob '{}' to bucket '{}'", uploaded.id, bucket_id);
        Ok(StoredFile { id: uploaded.id })
    }

    /// Upload a local file in chunks, reporting progress per chunk
    async fn upload_stream(
        &self,
        bucket_id: &str,
        file_id: &str,
        name: &str,
        mime_type: &str,
        uri: &str,
        on_progress: Option<&ProgressFn>,
    ) -> Result<StoredFile> {
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Validation(format!("Cannot read payload '{}': {}", uri, e)))?;

        let total = data.len() as u64;
        if total <= UPLOAD_CHUNK_SIZE as u64 {
            return self
                .upload_buffer(bucket_id, file_id, name, mime_type, data, on_progress)
                .await;
        }

        let url = format!("/storage/buckets/{}/files", bucket_id);
        let mut uploaded_id: Option<String> = None;
        let mut offset: u64 = 0;

        for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
            let end = offset + chunk.len() as u64;
            let form = Self::multipart_form(file_id, name, mime_type, chunk.to_vec())?;

            let mut builder = self
                .request(Method::POST, &url)
                .header(
                    "Content-Range",
                    format!("bytes {}-{}/{}", offset, end - 1, total),
                )
                .multipart(form);

            // Chunks after the first address the blob created by the first
            if let Some(id) = &uploaded_id {
                builder = builder.header("x-appwrite-id", id.clone());
            }

            let chunk_response: FileResponse = Self::send_json(builder).await?;
            uploaded_id.get_or_insert(chunk_response.id);

            offset = end;
            if let Some(callback) = on_progress {
                callback(UploadProgress {
                    loaded: offset,
                    total,
                });
            }
        }

        let id = uploaded_id
            .ok_or_else(|| AppError::Internal("Chunked upload produced no blob id".to_string()))?;

        debug!("Uploaded blob '{}' to bucket '{}' in chunks", id, bucket_id);
        Ok(StoredFile { id })
    }
}

#[async_trait]
impl AccountClient for AppwriteClient {
    async fn get_session(&self) -> Result<AccountInfo> {
        let response = self.request(Method::GET, "/account").send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthenticationRequired(
                "No active session".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let account = response.json::<AccountResponse>().await?;
        Ok(AccountInfo {
            account_id: account.id,
            email: account.email,
        })
    }

    async fn create_email_token(&self, user_id: &str, email: &str) -> Result<EmailToken> {
        let token: TokenResponse = Self::send_json(
            self.request(Method::POST, "/account/tokens/email")
                .json(&json!({ "userId": user_id, "email": email })),
        )
        .await?;

        Ok(EmailToken {
            user_id: token.user_id,
        })
    }

    async fn create_session(&self, account_id: &str, secret: &str) -> Result<Session> {
        let session: SessionResponse = Self::send_json(
            self.request(Method::POST, "/account/sessions/token")
                .json(&json!({ "userId": account_id, "secret": secret })),
        )
        .await?;

        Ok(Session {
            session_id: session.id,
            secret: session.secret,
        })
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        Self::send_empty(self.request(
            Method::DELETE,
            &format!("/account/sessions/{}", session_id),
        ))
        .await
    }

    fn set_session(&self, secret: &str) {
        if let Ok(mut guard) = self.session_secret.write() {
            *guard = Some(secret.to_string());
        }
    }

    fn clear_session(&self) {
        if let Ok(mut guard) = self.session_secret.write() {
            *guard = None;
        }
    }
}

#[async_trait]
impl DocumentsClient for AppwriteClient {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[QueryClause],
    ) -> Result<DocumentList> {
        let mut path = format!(
            "/databases/{}/collections/{}/documents",
            database_id, collection_id
        );

        let params: Vec<String> = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(&q.encode())))
            .collect();
        if !params.is_empty() {
            path = format!("{}?{}", path, params.join("&"));
        }

        let list: DocumentListResponse = Self::send_json(self.request(Method::GET, &path)).await?;
        Ok(DocumentList {
            total: list.total,
            documents: list.documents,
        })
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value> {
        Self::send_json(self.request(
            Method::GET,
            &format!(
                "/databases/{}/collections/{}/documents/{}",
                database_id, collection_id, document_id
            ),
        ))
        .await
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        Self::send_json(
            self.request(
                Method::POST,
                &format!(
                    "/databases/{}/collections/{}/documents",
                    database_id, collection_id
                ),
            )
            .json(&json!({ "documentId": document_id, "data": data })),
        )
        .await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        Self::send_json(
            self.request(
                Method::PATCH,
                &format!(
                    "/databases/{}/collections/{}/documents/{}",
                    database_id, collection_id, document_id
                ),
            )
            .json(&json!({ "data": data })),
        )
        .await
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        Self::send_empty(self.request(
            Method::DELETE,
            &format!(
                "/databases/{}/collections/{}/documents/{}",
                database_id, collection_id, document_id
            ),
        ))
        .await
    }
}

#[async_trait]
impl StorageClient for AppwriteClient {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        payload: &PayloadSource,
        on_progress: Option<ProgressFn>,
    ) -> Result<StoredFile> {
        match payload {
            PayloadSource::Buffer(buffer) => {
                self.upload_buffer(
                    bucket_id,
                    file_id,
                    &buffer.name,
                    &buffer.mime_type,
                    buffer.data.clone(),
                    on_progress.as_ref(),
                )
                .await
            }
            PayloadSource::Stream(stream) => {
                self.upload_stream(
                    bucket_id,
                    file_id,
                    &stream.name,
                    &stream.mime_type,
                    &stream.uri,
                    on_progress.as_ref(),
                )
                .await
            }
        }
    }

    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.config.endpoint, bucket_id, file_id, self.config.project_id
        )
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        Self::send_empty(self.request(
            Method::DELETE,
            &format!("/storage/buckets/{}/files/{}", bucket_id, file_id),
        ))
        .await?;

        debug!("Deleted blob '{}' from bucket '{}'", file_id, bucket_id);
        Ok(())
    }
}
