// ── Console domain model ──
//
// Canonical representations of the documents the console manages. API
// objects from `chililog-api` are converted into these types in
// `crate::convert`; consumers never handle wire shapes directly.

pub mod authenticated_user;
pub mod document_id;
pub mod repository;
pub mod repository_info;
pub mod user;

// ── Re-exports ──────────────────────────────────────────────────────

pub use authenticated_user::AuthenticatedUser;
pub use document_id::DocumentId;
pub use repository::{Repository, RepositoryStatus};
pub use repository_info::{QueueMaxMemoryPolicy, RepositoryInfo, StartupStatus};
pub use user::{User, UserStatus};
