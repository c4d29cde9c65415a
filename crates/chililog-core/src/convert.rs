// ── API-to-domain type conversions ──
//
// Bridges raw `chililog_api::models` objects into canonical `crate::model`
// types and back. Status strings are parsed leniently: unknown values fall
// back to the type's default with a warning rather than failing a sync.

use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use chililog_api::models::{AuthenticatedUserAo, RepositoryAo, RepositoryInfoAo, UserAo};

use crate::error::CoreError;
use crate::model::{
    AuthenticatedUser, DocumentId, QueueMaxMemoryPolicy, Repository, RepositoryInfo,
    RepositoryStatus, StartupStatus, User, UserStatus,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an optional enum string, defaulting (with a warning) when the
/// server sends something unrecognised.
fn parse_or_default<T: FromStr + Default>(field: &str, raw: Option<&str>) -> T {
    match raw {
        None | Some("") => T::default(),
        Some(s) => T::from_str(s).unwrap_or_else(|_| {
            warn!(field, value = s, "unrecognised value, using default");
            T::default()
        }),
    }
}

/// Every persisted document must carry a `DocumentID`.
fn require_id(kind: &str, raw: Option<String>) -> Result<DocumentId, CoreError> {
    raw.filter(|s| !s.is_empty())
        .map(DocumentId::from)
        .ok_or_else(|| CoreError::Protocol {
            message: format!("{kind} returned by server has no DocumentID"),
        })
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

// ── Repository configuration ───────────────────────────────────────

impl TryFrom<RepositoryInfoAo> for RepositoryInfo {
    type Error = CoreError;

    fn try_from(ao: RepositoryInfoAo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(require_id("Repository", ao.document_id)?),
            version: ao.document_version,
            name: ao.name,
            display_name: non_empty(ao.display_name),
            description: non_empty(ao.description),
            startup_status: parse_or_default::<StartupStatus>(
                "StartupStatus",
                ao.startup_status.as_deref(),
            ),
            read_queue_durable: ao.is_read_queue_durable,
            write_queue_durable: ao.is_write_queue_durable,
            write_queue_worker_count: ao.write_queue_worker_count,
            write_queue_max_memory: ao.write_queue_max_memory,
            write_queue_max_memory_policy: parse_or_default::<QueueMaxMemoryPolicy>(
                "WriteQueueMaxMemoryPolicy",
                ao.write_queue_max_memory_policy.as_deref(),
            ),
            write_queue_page_size: ao.write_queue_page_size,
            write_queue_page_count_cache: ao.write_queue_page_count_cache,
            max_keywords: ao.max_keywords,
            current_status: None,
            extra: ao.extra,
        })
    }
}

impl From<&RepositoryInfo> for RepositoryInfoAo {
    fn from(r: &RepositoryInfo) -> Self {
        Self {
            document_id: r.id.as_ref().map(ToString::to_string),
            document_version: r.version,
            name: r.name.clone(),
            display_name: r.display_name.clone(),
            description: r.description.clone(),
            startup_status: Some(r.startup_status.to_string()),
            is_read_queue_durable: r.read_queue_durable,
            is_write_queue_durable: r.write_queue_durable,
            write_queue_worker_count: r.write_queue_worker_count,
            write_queue_max_memory: r.write_queue_max_memory,
            write_queue_max_memory_policy: Some(r.write_queue_max_memory_policy.to_string()),
            write_queue_page_size: r.write_queue_page_size,
            write_queue_page_count_cache: r.write_queue_page_count_cache,
            max_keywords: r.max_keywords,
            extra: r.extra.clone(),
        }
    }
}

// ── Repository runtime ─────────────────────────────────────────────

impl TryFrom<RepositoryAo> for Repository {
    type Error = CoreError;

    fn try_from(ao: RepositoryAo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: require_id("Repository", ao.document_id)?,
            name: ao.name,
            display_name: non_empty(ao.display_name),
            status: match ao.status.as_deref() {
                Some(s) => RepositoryStatus::from_str(s).unwrap_or_else(|_| {
                    warn!(value = s, "unrecognised repository status, assuming OFFLINE");
                    RepositoryStatus::Offline
                }),
                None => RepositoryStatus::Offline,
            },
        })
    }
}

// ── Users ──────────────────────────────────────────────────────────

impl TryFrom<UserAo> for User {
    type Error = CoreError;

    fn try_from(ao: UserAo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(require_id("User", ao.document_id)?),
            version: ao.document_version,
            username: ao.username,
            email_address: non_empty(ao.email_address),
            display_name: non_empty(ao.display_name),
            status: parse_or_default::<UserStatus>("Status", ao.status.as_deref()),
            roles: ao.roles,
            gravatar_md5_hash: non_empty(ao.gravatar_md5_hash),
            password: None,
            extra: ao.extra,
        })
    }
}

impl From<&User> for UserAo {
    fn from(u: &User) -> Self {
        Self {
            document_id: u.id.as_ref().map(ToString::to_string),
            document_version: u.version,
            username: u.username.clone(),
            email_address: u.email_address.clone(),
            display_name: u.display_name.clone(),
            status: Some(u.status.to_string()),
            roles: u.roles.clone(),
            gravatar_md5_hash: u.gravatar_md5_hash.clone(),
            password: u
                .password
                .as_ref()
                .map(|p: &SecretString| p.expose_secret().to_owned()),
            extra: u.extra.clone(),
        }
    }
}

// ── Authenticated user ─────────────────────────────────────────────

impl TryFrom<AuthenticatedUserAo> for AuthenticatedUser {
    type Error = CoreError;

    fn try_from(ao: AuthenticatedUserAo) -> Result<Self, Self::Error> {
        Ok(Self {
            id: require_id("Authenticated user", Some(ao.document_id))?,
            version: ao.document_version,
            username: ao.username,
            email_address: non_empty(ao.email_address),
            display_name: non_empty(ao.display_name),
            roles: ao.roles,
            gravatar_md5_hash: non_empty(ao.gravatar_md5_hash),
        })
    }
}

impl From<&AuthenticatedUser> for AuthenticatedUserAo {
    fn from(u: &AuthenticatedUser) -> Self {
        Self {
            document_id: u.id.to_string(),
            document_version: u.version,
            username: u.username.clone(),
            email_address: u.email_address.clone(),
            display_name: u.display_name.clone(),
            roles: u.roles.clone(),
            gravatar_md5_hash: u.gravatar_md5_hash.clone(),
        }
    }
}
