// ── Copy-on-write edit sessions ──
//
// An edit session owns a private clone of a record. Mutations touch only the
// clone; the canonical collection is replaced from the server's response on
// save, and dropping the session discards every change.

use uuid::Uuid;

/// Lifecycle status of the record inside an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Created locally, never saved.
    ReadyNew,
    /// Unchanged since it was loaded from the canonical store.
    ReadyClean,
    /// Modified locally.
    ReadyDirty,
}

/// An isolated, single-owner overlay over one record.
///
/// Not `Clone`. Discarding a session means dropping it.
#[derive(Debug)]
pub struct EditSession<E> {
    id: Uuid,
    record: E,
    status: RecordStatus,
}

impl<E> EditSession<E> {
    /// Session over a record that has never been saved.
    pub(crate) fn new_record(record: E) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
            status: RecordStatus::ReadyNew,
        }
    }

    /// Session over a clone of a canonical record.
    pub(crate) fn existing(record: E) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
            status: RecordStatus::ReadyClean,
        }
    }

    /// Unique session identifier (for logging).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record(&self) -> &E {
        &self.record
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    pub fn is_new(&self) -> bool {
        self.status == RecordStatus::ReadyNew
    }

    pub fn is_dirty(&self) -> bool {
        self.status == RecordStatus::ReadyDirty
    }

    /// Mutate the session's record. Clean records become dirty; new records
    /// stay new.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut E) -> R) -> R {
        let out = f(&mut self.record);
        if self.status == RecordStatus::ReadyClean {
            self.status = RecordStatus::ReadyDirty;
        }
        out
    }
}
