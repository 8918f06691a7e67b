use std::sync::Arc;

use tracing::debug;

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::features::users::models::CatalogUser;
use crate::modules::backend::client::{AccountClient, DocumentsClient};
use crate::modules::backend::query::QueryClause;

/// Resolves the caller's catalog identity from the active session.
///
/// Never caches across calls: every resolution performs a fresh document
/// lookup so authorization checks always run against current state.
pub struct IdentityService {
    config: BackendConfig,
    account: Arc<dyn AccountClient>,
    documents: Arc<dyn DocumentsClient>,
}

impl IdentityService {
    pub fn new(
        config: BackendConfig,
        account: Arc<dyn AccountClient>,
        documents: Arc<dyn DocumentsClient>,
    ) -> Self {
        Self {
            config,
            account,
            documents,
        }
    }

    /// Resolve the catalog user behind the active session.
    ///
    /// Fails with `AuthenticationRequired` when no valid session exists,
    /// and with `UserNotFound` when the session is valid but no catalog
    /// user document references the account (provisioning inconsistency).
    pub async fn resolve_current_user(&self) -> Result<CatalogUser> {
        let account = self.account.get_session().await?;

        let result = self
            .documents
            .list_documents(
                &self.config.database_id,
                &self.config.users_collection_id,
                &[QueryClause::equal("accountId", &[&account.account_id])],
            )
            .await?;

        let document = result.documents.into_iter().next().ok_or_else(|| {
            AppError::UserNotFound(format!(
                "No catalog user for account '{}'",
                account.account_id
            ))
        })?;

        let user: CatalogUser = serde_json::from_value(document)?;
        debug!("Resolved catalog user '{}' ({})", user.id, user.email);
        Ok(user)
    }

    /// Look up a catalog user by email. Returns None when no user exists.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<CatalogUser>> {
        let result = self
            .documents
            .list_documents(
                &self.config.database_id,
                &self.config.users_collection_id,
                &[QueryClause::equal("email", &[email])],
            )
            .await?;

        match result.documents.into_iter().next() {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_backend_config, InMemoryBackend};

    fn service(backend: &Arc<InMemoryBackend>) -> IdentityService {
        IdentityService::new(
            test_backend_config(),
            backend.clone(),
            backend.clone(),
        )
    }

    #[tokio::test]
    async fn test_resolve_requires_session() {
        let backend = Arc::new(InMemoryBackend::new());
        let identity = service(&backend);

        let err = identity.resolve_current_user().await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired(_)));
    }

    #[tokio::test]
    async fn test_resolve_fails_without_catalog_user() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.open_session("acct-1", "orphan@example.com");

        let identity = service(&backend);
        let err = identity.resolve_current_user().await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_returns_catalog_user() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.open_session("acct-1", "alice@example.com");
        backend.seed_user("user-1", "acct-1", "Alice", "alice@example.com");

        let identity = service(&backend);
        let user = identity.resolve_current_user().await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.account_id, "acct-1");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_find_user_by_email() {
        tokio_test::block_on(async {
            let backend = Arc::new(InMemoryBackend::new());
            backend.seed_user("user-1", "acct-1", "Alice", "alice@example.com");

            let identity = service(&backend);
            let found = identity
                .find_user_by_email("alice@example.com")
                .await
                .unwrap();
            assert_eq!(found.unwrap().id, "user-1");

            let missing = identity
                .find_user_by_email("nobody@example.com")
                .await
                .unwrap();
            assert!(missing.is_none());
        });
    }
}
