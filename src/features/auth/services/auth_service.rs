use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::BackendConfig;
use crate::core::error::{AppError, Result};
use crate::features::users::services::IdentityService;
use crate::modules::backend::client::{AccountClient, DocumentsClient, Session};
use crate::shared::constants::DEFAULT_AVATAR_URL;

/// One-time-passcode sign-up and sign-in flows.
///
/// Accounts live in the external account service; the catalog user
/// document is provisioned here on first sign-up. OTP delivery itself
/// is the account service's concern.
pub struct AuthService {
    config: BackendConfig,
    account: Arc<dyn AccountClient>,
    documents: Arc<dyn DocumentsClient>,
    identity: Arc<IdentityService>,
}

impl AuthService {
    pub fn new(
        config: BackendConfig,
        account: Arc<dyn AccountClient>,
        documents: Arc<dyn DocumentsClient>,
        identity: Arc<IdentityService>,
    ) -> Self {
        Self {
            config,
            account,
            documents,
            identity,
        }
    }

    /// Send a one-time passcode to the given email.
    /// Returns the account identifier the passcode is bound to.
    pub async fn send_email_otp(&self, email: &str) -> Result<String> {
        let token = self
            .account
            .create_email_token(&Uuid::new_v4().simple().to_string(), email)
            .await?;

        debug!("Sent OTP for account '{}'", token.user_id);
        Ok(token.user_id)
    }

    /// Sign-up flow: send an OTP and provision the catalog user document
    /// on first sign-up. Existing users just get a fresh OTP.
    pub async fn create_account(&self, full_name: &str, email: &str) -> Result<String> {
        let existing = self.identity.find_user_by_email(email).await?;
        let account_id = self.send_email_otp(email).await?;

        if existing.is_none() {
            self.documents
                .create_document(
                    &self.config.database_id,
                    &self.config.users_collection_id,
                    &Uuid::new_v4().simple().to_string(),
                    json!({
                        "fullName": full_name,
                        "email": email,
                        "avatar": DEFAULT_AVATAR_URL,
                        "accountId": account_id,
                    }),
                )
                .await?;
            info!("Provisioned catalog user for account '{}'", account_id);
        }

        Ok(account_id)
    }

    /// Sign-in flow: OTP for existing users only
    pub async fn sign_in(&self, email: &str) -> Result<String> {
        match self.identity.find_user_by_email(email).await? {
            Some(user) => {
                self.send_email_otp(email).await?;
                Ok(user.account_id)
            }
            None => Err(AppError::UserNotFound(format!(
                "No account registered for '{}'",
                email
            ))),
        }
    }

    /// Exchange a received passcode for a session and install its secret
    /// on the backend client for subsequent requests.
    pub async fn verify_secret(&self, account_id: &str, secret: &str) -> Result<Session> {
        let session = self.account.create_session(account_id, secret).await?;
        self.account.set_session(&session.secret);

        info!("Session '{}' established", session.session_id);
        Ok(session)
    }

    /// Terminate the current session and drop the installed secret
    pub async fn sign_out(&self) -> Result<()> {
        self.account.delete_session("current").await?;
        self.account.clear_session();
        Ok(())
    }
}
