// ── Generic data controller ──
//
// Synchronizes one document type between the server and the local store,
// and applies create/update/delete through isolated edit sessions.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use tracing::{debug, error, info};

use chililog_api::{ApiClient, RepositoryAction};

use super::entity::{EditableEntity, Entity};
use crate::error::CoreError;
use crate::model::{DocumentId, Repository, RepositoryStatus};
use crate::session::SessionState;
use crate::store::reconcile::reconcile_by_absence;
use crate::store::{EditSession, LocalStore, SyncReport};
use crate::stream::EntityStream;

/// Result of a synchronization request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server listing was applied to the local store.
    Completed(SyncReport),
    /// Another synchronization of the same type was already running.
    /// Nothing was fetched and the store is unchanged.
    Skipped,
}

impl SyncOutcome {
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped => None,
        }
    }
}

/// Held for the duration of one synchronization; releases the flag on drop.
struct SyncLatch<'a>(&'a AtomicBool);

impl<'a> SyncLatch<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SyncLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Server synchronization and editing for documents of type `E`.
pub struct DataController<E: Entity> {
    client: ApiClient,
    store: Arc<LocalStore>,
    session: Arc<SessionState>,
    syncing: AtomicBool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> DataController<E> {
    pub(crate) fn new(client: ApiClient, store: Arc<LocalStore>, session: Arc<SessionState>) -> Self {
        Self {
            client,
            store,
            session,
            syncing: AtomicBool::new(false),
            _entity: PhantomData,
        }
    }

    fn token(&self) -> Result<SecretString, CoreError> {
        self.session.token().ok_or(CoreError::NotAuthenticated)
    }

    /// `true` while a synchronization of this type is running.
    pub fn is_synchronizing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Replace local records of this type with the server's full listing.
    ///
    /// With `clear_local_data`, local records are dropped before anything
    /// else happens, including the authentication check.
    pub async fn synchronize_with_server(
        &self,
        clear_local_data: bool,
    ) -> Result<SyncOutcome, CoreError> {
        let Some(_latch) = SyncLatch::acquire(&self.syncing) else {
            debug!(kind = E::KIND, "synchronization already in progress, skipping");
            return Ok(SyncOutcome::Skipped);
        };

        if clear_local_data {
            self.clear_local_data();
        }

        let result = self.fetch_and_reconcile().await;
        E::after_sync(&self.store);

        match result {
            Ok(report) => {
                debug!(
                    kind = E::KIND,
                    fetched = report.fetched,
                    inserted = report.inserted,
                    updated = report.updated,
                    removed = report.removed,
                    "synchronized"
                );
                Ok(SyncOutcome::Completed(report))
            }
            Err(e) => {
                error!(kind = E::KIND, error = %e, "synchronization failed");
                Err(e)
            }
        }
    }

    async fn fetch_and_reconcile(&self) -> Result<SyncReport, CoreError> {
        let token = self.token()?;
        let items: Vec<E::Ao> = self.client.list_documents(E::RESOURCE, &token).await?;

        let store = self.store.as_ref();
        reconcile_by_absence(E::collection(store), items, |ao| {
            let mut entity = E::from_api(ao)?;
            entity.link(store);
            let id = required_id(&entity)?;
            Ok((id, entity))
        })
    }

    /// Remove every local record of this type.
    pub fn clear_local_data(&self) {
        E::collection(&self.store).clear();
    }

    pub fn get(&self, document_id: &DocumentId) -> Option<Arc<E>> {
        E::collection(&self.store).get(document_id)
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<E>>> {
        E::collection(&self.store).snapshot()
    }

    pub fn subscribe(&self) -> EntityStream<E> {
        EntityStream::new(E::collection(&self.store).subscribe())
    }
}

impl<E: EditableEntity> DataController<E> {
    /// Start editing a new, never-saved record.
    pub fn create(&self) -> EditSession<E> {
        let session = EditSession::new_record(E::new_unsaved());
        debug!(kind = E::KIND, session = %session.id(), "created new record");
        session
    }

    /// Start editing a copy of a canonical record. `None` if the store has
    /// no record with that identifier.
    pub fn edit(&self, document_id: &DocumentId) -> Option<EditSession<E>> {
        let record = self.get(document_id)?;
        let session = EditSession::existing((*record).clone());
        debug!(kind = E::KIND, %document_id, session = %session.id(), "editing record");
        Some(session)
    }

    /// Send the session's record to the server.
    ///
    /// Version 0 records are created, anything else is updated. On success
    /// the canonical record is replaced from the server's response; on
    /// failure the canonical store is untouched and the session keeps its
    /// edits.
    pub async fn save(&self, session: &EditSession<E>) -> Result<DocumentId, CoreError> {
        let record = session.record();
        record.validate()?;
        let token = self.token()?;
        let body = record.to_api();

        let expected = if record.document_version() == 0 {
            None
        } else {
            Some(required_id(record)?)
        };

        let response: E::Ao = match &expected {
            None => {
                self.client
                    .create_document(E::RESOURCE, &token, &body)
                    .await?
            }
            Some(id) => {
                self.client
                    .update_document(E::RESOURCE, &token, id.as_str(), &body)
                    .await?
            }
        };

        let mut saved = E::from_api(response)?;
        let saved_id = required_id(&saved)?;
        if let Some(expected) = expected {
            if expected != saved_id {
                return Err(CoreError::Integrity {
                    expected: expected.to_string(),
                    actual: saved_id.to_string(),
                });
            }
        }

        saved.link(&self.store);
        E::collection(&self.store).upsert(saved_id.clone(), saved);
        info!(kind = E::KIND, document_id = %saved_id, session = %session.id(), "saved");
        Ok(saved_id)
    }

    /// Drop an edit session. The canonical store is never touched.
    pub fn discard_changes(&self, session: EditSession<E>) {
        debug!(kind = E::KIND, session = %session.id(), "discarded changes");
        drop(session);
    }

    /// Delete a document on the server, then locally.
    pub async fn erase(&self, document_id: &DocumentId) -> Result<(), CoreError> {
        let token = self.token()?;
        self.client
            .delete_document(E::RESOURCE, &token, document_id.as_str())
            .await?;
        E::collection(&self.store).remove(document_id);
        info!(kind = E::KIND, %document_id, "erased");
        Ok(())
    }
}

impl DataController<Repository> {
    /// Bring a repository online, make it read-only, or take it offline.
    ///
    /// Replaces the local runtime record with the server's response and
    /// refreshes the linked configuration's current status.
    pub async fn change_status(
        &self,
        document_id: &DocumentId,
        status: RepositoryStatus,
    ) -> Result<Arc<Repository>, CoreError> {
        let token = self.token()?;
        let action = match status {
            RepositoryStatus::Online => RepositoryAction::Start,
            RepositoryStatus::ReadOnly => RepositoryAction::ReadOnly,
            RepositoryStatus::Offline => RepositoryAction::Stop,
        };

        let ao = self
            .client
            .repository_action(&token, document_id.as_str(), action)
            .await?;
        let repository = Repository::try_from(ao)?;
        let id = repository.id.clone();
        info!(document_id = %id, %action, status = %repository.status, "repository status changed");

        self.store.repositories.upsert(id.clone(), repository);
        self.store.relink_repository_info();
        self.get(&id).ok_or_else(|| CoreError::NotFound {
            entity: Repository::KIND,
            identifier: id.to_string(),
        })
    }
}

fn required_id<E: Entity>(entity: &E) -> Result<DocumentId, CoreError> {
    entity
        .document_id()
        .cloned()
        .ok_or_else(|| CoreError::Protocol {
            message: format!("{} has no document ID", E::KIND),
        })
}
