// Chililog API object (AO) types
//
// Wire representations exchanged with the server. Field names are PascalCase
// with the `DocumentID` / `DocumentVersion` pair on every persisted document.
// Enumerations stay as raw strings here; `chililog-core` parses them into
// strong types. Unknown fields land in `extra` so that a PUT round-trips
// server data this crate does not model (repository parsers, for instance).

use serde::{Deserialize, Serialize};

// ── Repository configuration ─────────────────────────────────────────

/// Repository configuration document from `/api/repository_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryInfoAo {
    #[serde(rename = "DocumentID", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub document_version: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `ONLINE` or `OFFLINE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_status: Option<String>,
    #[serde(default)]
    pub is_read_queue_durable: bool,
    #[serde(default)]
    pub is_write_queue_durable: bool,
    #[serde(default)]
    pub write_queue_worker_count: u32,
    #[serde(default)]
    pub write_queue_max_memory: u64,
    /// `PAGE`, `DROP` or `BLOCK`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_queue_max_memory_policy: Option<String>,
    #[serde(default)]
    pub write_queue_page_size: u64,
    #[serde(default)]
    pub write_queue_page_count_cache: u32,
    /// -1 means unlimited.
    #[serde(default)]
    pub max_keywords: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Repository runtime ───────────────────────────────────────────────

/// Runtime state of a repository from `/api/repositories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryAo {
    #[serde(rename = "DocumentID", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// `ONLINE`, `OFFLINE` or `READONLY`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Users ────────────────────────────────────────────────────────────

/// User document from `/api/users`.
///
/// `password` is only ever sent (on create); the server never returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAo {
    #[serde(rename = "DocumentID", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub document_version: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `Enabled`, `Disabled` or `Locked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(
        rename = "GravatarMD5Hash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gravatar_md5_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Authentication ───────────────────────────────────────────────────

/// The logged-in user's profile from `/api/Authentication`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticatedUserAo {
    #[serde(rename = "DocumentID")]
    pub document_id: String,
    #[serde(default)]
    pub document_version: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(
        rename = "GravatarMD5Hash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gravatar_md5_hash: Option<String>,
}

/// How the server computes a token's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryType {
    /// Expires a fixed number of seconds after login.
    Absolute,
    /// Expiry slides forward on each request.
    Sliding,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn repository_info_keeps_unmodelled_fields() {
        let raw = json!({
            "DocumentID": "4d8b",
            "DocumentVersion": 3,
            "Name": "sandpit",
            "StartupStatus": "ONLINE",
            "WriteQueueMaxMemory": 20_971_520,
            "MaxKeywords": -1,
            "Parsers": [{ "Name": "default", "ClassName": "DelimitedEntryParser" }]
        });

        let ao: RepositoryInfoAo = serde_json::from_value(raw).unwrap();
        assert_eq!(ao.document_id.as_deref(), Some("4d8b"));
        assert_eq!(ao.max_keywords, -1);
        assert!(ao.extra.contains_key("Parsers"));

        let back = serde_json::to_value(&ao).unwrap();
        assert_eq!(back["Parsers"][0]["Name"], "default");
        assert_eq!(back["WriteQueueMaxMemory"], 20_971_520);
    }

    #[test]
    fn unsaved_user_omits_document_id() {
        let ao = UserAo {
            username: "mary".into(),
            password: Some("secret1".into()),
            ..UserAo::default()
        };
        let value = serde_json::to_value(&ao).unwrap();
        assert!(value.get("DocumentID").is_none());
        assert_eq!(value["DocumentVersion"], 0);
        assert_eq!(value["Password"], "secret1");
        assert!(value.get("GravatarMD5Hash").is_none());
    }
}
