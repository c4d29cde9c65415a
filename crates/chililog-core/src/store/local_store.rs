// ── Console local store ──
//
// Process-wide canonical records for every document type the console
// manages, plus the logged-in user. Mutations are broadcast to subscribers
// via `watch` channels.

use std::sync::Arc;

use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{AuthenticatedUser, Repository, RepositoryInfo, RepositoryStatus, User};
use crate::stream::EntityStream;

/// Canonical local copy of server state.
///
/// Shared as `Arc<LocalStore>`. Records here are always clean: they are
/// written only from server responses, never from in-progress edits.
pub struct LocalStore {
    pub(crate) repository_info: EntityCollection<RepositoryInfo>,
    pub(crate) repositories: EntityCollection<Repository>,
    pub(crate) users: EntityCollection<User>,
    authenticated_user: watch::Sender<Option<Arc<AuthenticatedUser>>>,
}

impl LocalStore {
    pub fn new() -> Self {
        let (authenticated_user, _) = watch::channel(None);
        Self {
            repository_info: EntityCollection::new(),
            repositories: EntityCollection::new(),
            users: EntityCollection::new(),
            authenticated_user,
        }
    }

    // ── Collection accessors ─────────────────────────────────────────

    pub fn repository_info(&self) -> &EntityCollection<RepositoryInfo> {
        &self.repository_info
    }

    pub fn repositories(&self) -> &EntityCollection<Repository> {
        &self.repositories
    }

    pub fn users(&self) -> &EntityCollection<User> {
        &self.users
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_repository_info(&self) -> EntityStream<RepositoryInfo> {
        EntityStream::new(self.repository_info.subscribe())
    }

    pub fn subscribe_repositories(&self) -> EntityStream<Repository> {
        EntityStream::new(self.repositories.subscribe())
    }

    pub fn subscribe_users(&self) -> EntityStream<User> {
        EntityStream::new(self.users.subscribe())
    }

    pub fn subscribe_authenticated_user(&self) -> watch::Receiver<Option<Arc<AuthenticatedUser>>> {
        self.authenticated_user.subscribe()
    }

    // ── Authenticated user ───────────────────────────────────────────

    pub fn authenticated_user(&self) -> Option<Arc<AuthenticatedUser>> {
        self.authenticated_user.borrow().clone()
    }

    /// Replace (or with `None`, remove) the logged-in user.
    pub(crate) fn set_authenticated_user(&self, user: Option<AuthenticatedUser>) {
        self.authenticated_user
            .send_modify(|current| *current = user.map(Arc::new));
    }

    // ── Cross-references ─────────────────────────────────────────────

    pub fn find_repository_by_name(&self, name: &str) -> Option<Arc<Repository>> {
        self.repositories.find(|r| r.name == name)
    }

    pub fn find_repository_info_by_name(&self, name: &str) -> Option<Arc<RepositoryInfo>> {
        self.repository_info.find(|r| r.name == name)
    }

    /// Runtime status of the repository named `name`, if the runtime list
    /// has it.
    pub(crate) fn runtime_status_of(&self, name: &str) -> Option<RepositoryStatus> {
        self.find_repository_by_name(name).map(|r| r.status)
    }

    /// Refresh `current_status` on every repository configuration whose
    /// linked runtime status has changed.
    pub(crate) fn relink_repository_info(&self) {
        for info in self.repository_info.snapshot().iter() {
            let status = self.runtime_status_of(&info.name);
            if info.current_status == status {
                continue;
            }
            if let Some(id) = info.id.clone() {
                let mut updated = (**info).clone();
                updated.current_status = status;
                self.repository_info.upsert(id, updated);
            }
        }
    }

    /// Drop every document record. The authenticated user is untouched.
    pub fn clear_documents(&self) {
        self.repository_info.clear();
        self.repositories.clear();
        self.users.clear();
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}
