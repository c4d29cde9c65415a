// ── Entity traits ──
//
// Per-type knowledge the generic `DataController` needs: which server
// collection a type lives in, how to convert its API object, where it is
// stored locally, and how it links to other records.

use serde::Serialize;
use serde::de::DeserializeOwned;

use chililog_api::Resource;
use chililog_api::models::{RepositoryAo, RepositoryInfoAo, UserAo};

use crate::error::CoreError;
use crate::model::{DocumentId, Repository, RepositoryInfo, User};
use crate::store::{EntityCollection, LocalStore};

/// A document type that can be synchronized from the server.
pub trait Entity: Clone + Send + Sync + Sized + 'static {
    /// Human-readable type name for logs and errors.
    const KIND: &'static str;
    /// Server collection holding this type.
    const RESOURCE: Resource;
    /// Wire representation.
    type Ao: DeserializeOwned + Serialize + Send + Sync + 'static;

    fn document_id(&self) -> Option<&DocumentId>;

    /// Local collection holding canonical records of this type.
    fn collection(store: &LocalStore) -> &EntityCollection<Self>;

    fn from_api(ao: Self::Ao) -> Result<Self, CoreError>;

    /// Update cross-reference fields from other collections.
    fn link(&mut self, _store: &LocalStore) {}

    /// Runs after a completed synchronization of this type.
    fn after_sync(_store: &LocalStore) {}
}

/// A document type the console can create, edit, and erase.
pub trait EditableEntity: Entity {
    /// A fresh unsaved record (version 0) with type-specific defaults.
    fn new_unsaved() -> Self;

    fn document_version(&self) -> u64;

    fn to_api(&self) -> Self::Ao;

    /// Client-side checks run before any network call.
    fn validate(&self) -> Result<(), CoreError>;
}

// ── Repository configuration ─────────────────────────────────────────

impl Entity for RepositoryInfo {
    const KIND: &'static str = "Repository";
    const RESOURCE: Resource = Resource::RepositoryInfo;
    type Ao = RepositoryInfoAo;

    fn document_id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn collection(store: &LocalStore) -> &EntityCollection<Self> {
        &store.repository_info
    }

    fn from_api(ao: Self::Ao) -> Result<Self, CoreError> {
        Self::try_from(ao)
    }

    fn link(&mut self, store: &LocalStore) {
        if let Some(status) = store.runtime_status_of(&self.name) {
            self.current_status = Some(status);
        }
    }
}

impl EditableEntity for RepositoryInfo {
    fn new_unsaved() -> Self {
        Self::default()
    }

    fn document_version(&self) -> u64 {
        self.version
    }

    fn to_api(&self) -> Self::Ao {
        RepositoryInfoAo::from(self)
    }

    fn validate(&self) -> Result<(), CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("name", "Name is required"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(CoreError::validation(
                "name",
                "Name may only contain lowercase letters, digits and '_'",
            ));
        }
        if self.write_queue_worker_count == 0 {
            return Err(CoreError::validation(
                "write_queue_worker_count",
                "At least one write queue worker is required",
            ));
        }
        if self.max_keywords < -1 {
            return Err(CoreError::validation(
                "max_keywords",
                "Must be -1 (unlimited) or a non-negative number",
            ));
        }
        Ok(())
    }
}

// ── Repository runtime ───────────────────────────────────────────────

impl Entity for Repository {
    const KIND: &'static str = "Repository runtime";
    const RESOURCE: Resource = Resource::Repositories;
    type Ao = RepositoryAo;

    fn document_id(&self) -> Option<&DocumentId> {
        Some(&self.id)
    }

    fn collection(store: &LocalStore) -> &EntityCollection<Self> {
        &store.repositories
    }

    fn from_api(ao: Self::Ao) -> Result<Self, CoreError> {
        Self::try_from(ao)
    }

    fn after_sync(store: &LocalStore) {
        store.relink_repository_info();
    }
}

// ── Users ────────────────────────────────────────────────────────────

impl Entity for User {
    const KIND: &'static str = "User";
    const RESOURCE: Resource = Resource::Users;
    type Ao = UserAo;

    fn document_id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    fn collection(store: &LocalStore) -> &EntityCollection<Self> {
        &store.users
    }

    fn from_api(ao: Self::Ao) -> Result<Self, CoreError> {
        Self::try_from(ao)
    }
}

impl EditableEntity for User {
    fn new_unsaved() -> Self {
        Self::default()
    }

    fn document_version(&self) -> u64 {
        self.version
    }

    fn to_api(&self) -> Self::Ao {
        UserAo::from(self)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() {
            return Err(CoreError::validation("username", "Username is required"));
        }
        if let Some(email) = self.email_address.as_deref() {
            if !email.contains('@') {
                return Err(CoreError::validation(
                    "email_address",
                    "Email address is invalid",
                ));
            }
        }
        if self.version == 0 && self.password.is_none() {
            return Err(CoreError::validation(
                "password",
                "A password is required for new users",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::repository_info::{
        DEFAULT_MAX_KEYWORDS, DEFAULT_WRITE_QUEUE_MAX_MEMORY, DEFAULT_WRITE_QUEUE_PAGE_SIZE,
    };
    use secrecy::SecretString;

    #[test]
    fn new_repository_has_documented_defaults() {
        let repo = RepositoryInfo::new_unsaved();
        assert_eq!(repo.document_version(), 0);
        assert!(repo.id.is_none());
        assert_eq!(repo.max_keywords, DEFAULT_MAX_KEYWORDS);
        assert_eq!(repo.write_queue_worker_count, 1);
        assert_eq!(repo.write_queue_max_memory, DEFAULT_WRITE_QUEUE_MAX_MEMORY);
        assert_eq!(repo.write_queue_page_size, DEFAULT_WRITE_QUEUE_PAGE_SIZE);
        assert_eq!(repo.write_queue_page_count_cache, 3);
    }

    #[test]
    fn repository_name_is_required() {
        let repo = RepositoryInfo::new_unsaved();
        assert!(matches!(
            repo.validate(),
            Err(CoreError::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn repository_name_must_be_lowercase() {
        let repo = RepositoryInfo {
            name: "Web Logs".into(),
            ..RepositoryInfo::new_unsaved()
        };
        assert!(repo.validate().is_err());
    }

    #[test]
    fn new_user_needs_password() {
        let mut user = User {
            username: "mary".into(),
            ..User::new_unsaved()
        };
        assert!(matches!(
            user.validate(),
            Err(CoreError::Validation { field: "password", .. })
        ));

        user.password = Some(SecretString::from("pw".to_string()));
        assert!(user.validate().is_ok());
    }

    #[test]
    fn existing_user_saves_without_password() {
        let user = User {
            username: "mary".into(),
            version: 3,
            ..User::new_unsaved()
        };
        assert!(user.validate().is_ok());
    }
}
