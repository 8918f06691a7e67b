use serde::{Deserialize, Serialize};

/// Catalog user profile, distinct from the raw authentication account.
///
/// Created once per account at first sign-up; the root of authorization
/// for every file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogUser {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
}
