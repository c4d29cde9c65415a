// ── Repository configuration domain type ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::document_id::DocumentId;
use super::repository::RepositoryStatus;

/// Default keyword limit for new repositories.
pub const DEFAULT_MAX_KEYWORDS: i64 = 20;
/// `max_keywords` value meaning "no limit".
pub const MAX_KEYWORDS_UNLIMITED: i64 = -1;
pub const DEFAULT_WRITE_QUEUE_WORKER_COUNT: u32 = 1;
/// 20MB
pub const DEFAULT_WRITE_QUEUE_MAX_MEMORY: u64 = 20_971_520;
/// 4MB
pub const DEFAULT_WRITE_QUEUE_PAGE_SIZE: u64 = 4_194_304;
pub const DEFAULT_WRITE_QUEUE_PAGE_COUNT_CACHE: u32 = 3;

/// Status a repository takes when the server starts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum StartupStatus {
    #[default]
    Online,
    Offline,
}

/// What the write queue does once `write_queue_max_memory` is reached.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum QueueMaxMemoryPolicy {
    /// Spill to disk.
    #[default]
    Page,
    /// Discard new entries.
    Drop,
    /// Block producers.
    Block,
}

/// Configuration of one log repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// `None` until the server has stored the record.
    pub id: Option<DocumentId>,
    /// 0 for records that were never saved.
    pub version: u64,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub startup_status: StartupStatus,
    pub read_queue_durable: bool,
    pub write_queue_durable: bool,
    pub write_queue_worker_count: u32,
    pub write_queue_max_memory: u64,
    pub write_queue_max_memory_policy: QueueMaxMemoryPolicy,
    pub write_queue_page_size: u64,
    pub write_queue_page_count_cache: u32,
    pub max_keywords: i64,

    /// Runtime status of the repository with the same name, linked locally.
    pub current_status: Option<RepositoryStatus>,

    /// Server fields the console does not edit, sent back untouched on save.
    #[serde(skip)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RepositoryInfo {
    fn default() -> Self {
        Self {
            id: None,
            version: 0,
            name: String::new(),
            display_name: None,
            description: None,
            startup_status: StartupStatus::default(),
            read_queue_durable: false,
            write_queue_durable: false,
            write_queue_worker_count: DEFAULT_WRITE_QUEUE_WORKER_COUNT,
            write_queue_max_memory: DEFAULT_WRITE_QUEUE_MAX_MEMORY,
            write_queue_max_memory_policy: QueueMaxMemoryPolicy::default(),
            write_queue_page_size: DEFAULT_WRITE_QUEUE_PAGE_SIZE,
            write_queue_page_count_cache: DEFAULT_WRITE_QUEUE_PAGE_COUNT_CACHE,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            current_status: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl RepositoryInfo {
    /// Display name, falling back to the repository name.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn has_unlimited_keywords(&self) -> bool {
        self.max_keywords == MAX_KEYWORDS_UNLIMITED
    }
}
