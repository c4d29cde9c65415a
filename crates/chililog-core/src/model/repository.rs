// ── Repository runtime domain type ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::document_id::DocumentId;

/// Runtime status of a repository on the server.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RepositoryStatus {
    Online,
    ReadOnly,
    Offline,
}

/// A repository as it is currently running on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: DocumentId,
    pub name: String,
    pub display_name: Option<String>,
    pub status: RepositoryStatus,
}
