// ── Generic reactive document collection ──
//
// Concurrent storage keyed by document identifier, with push-based change
// notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::DocumentId;

/// A concurrent, reactive collection of canonical records for one
/// document type.
///
/// Records are immutable once stored (`Arc<T>`); edits happen on clones in
/// an [`EditSession`](super::EditSession) and come back via `upsert`. Every
/// mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive.
pub struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_id: DashMap<DocumentId, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot ordered by identifier, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace a record. Returns `true` if the identifier was new.
    pub(crate) fn upsert(&self, id: DocumentId, entity: T) -> bool {
        let is_new = self.by_id.insert(id, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        self.bump_version();
        is_new
    }

    /// Remove a record. Returns the removed record if it existed.
    pub(crate) fn remove(&self, id: &DocumentId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Remove all records.
    pub(crate) fn clear(&self) {
        self.by_id.clear();
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub fn get(&self, id: &DocumentId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.by_id.contains_key(id)
    }

    /// First record matching `predicate`, in identifier order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<Arc<T>> {
        self.snapshot()
            .iter()
            .find(|entity| predicate(entity))
            .cloned()
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    /// Number of mutations applied so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All current identifiers.
    pub fn ids(&self) -> Vec<DocumentId> {
        self.by_id.iter().map(|r| r.key().clone()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into an ordered snapshot and broadcast it.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(DocumentId, Arc<T>)> = self
            .by_id
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> DocumentId {
        DocumentId::from(s)
    }

    #[test]
    fn upsert_reports_new_and_existing() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert(id("a"), "hello".into()));
        assert!(!col.upsert(id("a"), "world".into()));
        assert_eq!(*col.get(&id("a")).unwrap(), "world");
    }

    #[test]
    fn remove_only_bumps_version_when_present() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(id("a"), "x".into());
        let v = col.version();

        assert!(col.remove(&id("missing")).is_none());
        assert_eq!(col.version(), v);

        assert_eq!(*col.remove(&id("a")).unwrap(), "x");
        assert_eq!(col.version(), v + 1);
        assert!(col.is_empty());
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(id("c"), "third".into());
        col.upsert(id("a"), "first".into());
        col.upsert(id("b"), "second".into());

        let snap = col.snapshot();
        let values: Vec<&str> = snap.iter().map(|s| s.as_str()).collect();
        assert_eq!(values, vec!["first", "second", "third"]);
    }

    #[test]
    fn clear_empties_everything() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(id("a"), "x".into());
        col.upsert(id("b"), "y".into());
        assert_eq!(col.len(), 2);

        col.clear();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }

    #[test]
    fn subscribers_see_mutations() {
        let col: EntityCollection<String> = EntityCollection::new();
        let mut rx = col.subscribe();
        assert!(!rx.has_changed().unwrap());

        col.upsert(id("a"), "x".into());
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn find_matches_predicate() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(id("a"), "alpha".into());
        col.upsert(id("b"), "beta".into());
        assert_eq!(*col.find(|s| s.starts_with('b')).unwrap(), "beta");
        assert!(col.find(|s| s.is_empty()).is_none());
    }
}
