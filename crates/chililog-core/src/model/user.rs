// ── User domain type ──

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::document_id::DocumentId;

/// Role granting full administrative rights.
pub const SYSTEM_ADMINISTRATOR_ROLE: &str = "system.administrator";

/// Role granting administrative rights over one repository.
pub fn repository_administrator_role(repository_name: &str) -> String {
    format!("repo.{repository_name}.administrator")
}

/// Role granting read access to one repository.
pub fn repository_workbench_role(repository_name: &str) -> String {
    format!("repo.{repository_name}.workbench")
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
    Locked,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Option<DocumentId>,
    pub version: u64,
    pub username: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    pub status: UserStatus,
    pub roles: Vec<String>,
    pub gravatar_md5_hash: Option<String>,
    /// Only sent when creating a user; never returned by the server.
    #[serde(skip)]
    pub password: Option<SecretString>,

    #[serde(skip)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
