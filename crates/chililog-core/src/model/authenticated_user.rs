// ── Logged-in user ──

use serde::{Deserialize, Serialize};

use super::document_id::DocumentId;
use super::user::{SYSTEM_ADMINISTRATOR_ROLE, repository_administrator_role};

const GRAVATAR_URL_PREFIX: &str = "http://www.gravatar.com/avatar/";

/// Profile of the user who owns the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: DocumentId,
    pub version: u64,
    pub username: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
    pub gravatar_md5_hash: Option<String>,
}

impl AuthenticatedUser {
    /// Display name if set, otherwise the username.
    pub fn display_name_or_username(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }

    /// 18px avatar URL, falling back to gravatar's mystery-man image.
    pub fn gravatar_url(&self) -> Option<String> {
        self.gravatar_md5_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|hash| format!("{GRAVATAR_URL_PREFIX}{hash}.jpg?s=18&d=mm"))
    }

    pub fn is_system_administrator(&self) -> bool {
        self.roles.iter().any(|r| r == SYSTEM_ADMINISTRATOR_ROLE)
    }

    /// Administrator of at least one repository.
    pub fn is_repository_administrator(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r.starts_with("repo.") && r.ends_with(".administrator"))
    }

    pub fn is_repository_administrator_of(&self, repository_name: &str) -> bool {
        let role = repository_administrator_role(repository_name);
        self.roles.iter().any(|r| *r == role)
    }
}
