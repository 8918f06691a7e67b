use std::sync::Arc;

use crate::core::config::Config;
use crate::features::auth::AuthService;
use crate::features::files::services::{FileCatalogService, UploadService, UploadTracker};
use crate::features::users::services::IdentityService;
use crate::modules::backend::appwrite::AppwriteClient;
use crate::modules::backend::client::{AccountClient, DocumentsClient, StorageClient};

/// Composition root: wires the concrete backend client into every
/// service exactly once at startup. The embedding application holds one
/// `AppContext` for its lifetime.
pub struct AppContext {
    pub config: Config,
    pub tracker: Arc<UploadTracker>,
    pub identity: Arc<IdentityService>,
    pub auth: Arc<AuthService>,
    pub catalog: Arc<FileCatalogService>,
    pub uploads: Arc<UploadService>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(AppwriteClient::new(config.backend.clone()));
        let account: Arc<dyn AccountClient> = backend.clone();
        let documents: Arc<dyn DocumentsClient> = backend.clone();
        let storage: Arc<dyn StorageClient> = backend;

        let tracker = Arc::new(UploadTracker::new());
        let identity = Arc::new(IdentityService::new(
            config.backend.clone(),
            account.clone(),
            documents.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            config.backend.clone(),
            account,
            documents.clone(),
            identity.clone(),
        ));
        let catalog = Arc::new(FileCatalogService::new(
            config.backend.clone(),
            config.storage.clone(),
            documents.clone(),
            storage.clone(),
            identity.clone(),
        ));
        let uploads = Arc::new(UploadService::new(
            config.backend.clone(),
            config.storage.clone(),
            identity.clone(),
            documents,
            storage,
            tracker.clone(),
        ));

        Self {
            config,
            tracker,
            identity,
            auth,
            catalog,
            uploads,
        }
    }

    /// Build a context from environment configuration
    pub fn from_env() -> Result<Self, String> {
        Ok(Self::new(Config::from_env()?))
    }
}
