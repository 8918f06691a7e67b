use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub storage: StorageConfig,
}

/// Backend endpoint and document database identifiers
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend endpoint URL (e.g. https://cloud.appwrite.io/v1)
    pub endpoint: String,
    /// Project identifier sent with every request
    pub project_id: String,
    /// Document database identifier
    pub database_id: String,
    /// Collection holding FileRecord documents
    pub files_collection_id: String,
    /// Collection holding CatalogUser documents
    pub users_collection_id: String,
}

/// Object storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket identifier for uploaded blobs
    pub bucket_id: String,
    /// Total storage capacity reported in usage summaries, in bytes
    pub total_capacity_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            backend: BackendConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var("STORIFY_BACKEND_ENDPOINT")
            .map_err(|_| "STORIFY_BACKEND_ENDPOINT must be set".to_string())?;

        let project_id = env::var("STORIFY_PROJECT_ID")
            .map_err(|_| "STORIFY_PROJECT_ID must be set".to_string())?;

        let database_id = env::var("STORIFY_DATABASE_ID")
            .map_err(|_| "STORIFY_DATABASE_ID must be set".to_string())?;

        let files_collection_id = env::var("STORIFY_FILES_COLLECTION_ID")
            .map_err(|_| "STORIFY_FILES_COLLECTION_ID must be set".to_string())?;

        let users_collection_id = env::var("STORIFY_USERS_COLLECTION_ID")
            .map_err(|_| "STORIFY_USERS_COLLECTION_ID must be set".to_string())?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            database_id,
            files_collection_id,
            users_collection_id,
        })
    }
}

impl StorageConfig {
    /// Default capacity shown to users: 2 GiB
    const DEFAULT_TOTAL_CAPACITY_BYTES: u64 = 2 * 1024 * 1024 * 1024;

    pub fn from_env() -> Result<Self, String> {
        let bucket_id = env::var("STORIFY_BUCKET_ID")
            .map_err(|_| "STORIFY_BUCKET_ID must be set".to_string())?;

        let total_capacity_bytes = env::var("STORIFY_TOTAL_CAPACITY_BYTES")
            .unwrap_or_else(|_| Self::DEFAULT_TOTAL_CAPACITY_BYTES.to_string())
            .parse::<u64>()
            .map_err(|_| "STORIFY_TOTAL_CAPACITY_BYTES must be a valid number".to_string())?;

        Ok(Self {
            bucket_id,
            total_capacity_bytes,
        })
    }
}
