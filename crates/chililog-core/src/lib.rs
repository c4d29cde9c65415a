//! Local data layer between `chililog-api` and the console front ends.
//!
//! This crate owns the business logic, domain model, and reactive storage
//! for the Chililog administration console:
//!
//! - **[`Console`]** -- Facade constructed once per server. Owns the API
//!   client, the [`LocalStore`], the [`SessionController`], and one
//!   [`DataController`] per document type.
//!   [`synchronize_server_data()`](Console::synchronize_server_data) refreshes
//!   repository runtime status, repository configuration, then users.
//!
//! - **[`DataController<E>`]** -- Full-listing synchronization guarded by a
//!   per-type latch, plus create / edit / save / discard / erase through
//!   isolated [`EditSession`]s. The canonical store only ever holds what the
//!   server returned.
//!
//! - **[`LocalStore`]** -- `EntityCollection<T>` per document type
//!   (`DashMap` + `tokio::sync::watch`), vending [`EntityStream`]
//!   subscriptions.
//!
//! - **[`Navigator`]** -- The console's screens as a state machine over
//!   section × mode, with entry/exit actions that bind, save, and discard
//!   edit sessions.
//!
//! - **Domain model** ([`model`]) -- [`RepositoryInfo`], [`Repository`],
//!   [`User`], [`AuthenticatedUser`] keyed by [`DocumentId`].

pub mod config;
pub mod console;
pub mod convert;
pub mod data;
pub mod error;
pub mod model;
pub mod session;
pub mod statechart;
pub mod store;
pub mod stream;
pub mod token_store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, TlsVerification};
pub use console::{Console, SyncSummary};
pub use data::{DataController, EditableEntity, Entity, SyncOutcome};
pub use error::CoreError;
pub use session::{Authentication, SessionController, SessionState};
pub use statechart::{DetailController, Event, Mode, Navigator, Section, State};
pub use store::{EditSession, EntityCollection, LocalStore, RecordStatus, SyncReport};
pub use stream::EntityStream;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenClaims, TokenStore};

pub use model::{
    AuthenticatedUser, DocumentId, QueueMaxMemoryPolicy, Repository, RepositoryInfo,
    RepositoryStatus, StartupStatus, User, UserStatus,
};
