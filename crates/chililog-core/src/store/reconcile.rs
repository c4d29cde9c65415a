// ── Full-listing reconciliation ──
//
// Applies a complete server listing to one collection: upsert every
// returned document, then prune local records whose identifier was absent
// from the listing.

use std::collections::HashSet;

use serde::Serialize;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::DocumentId;

/// Counts from one completed reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Documents in the server listing.
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Local records removed because the server no longer lists them.
    pub removed: usize,
}

/// Upsert each converted item in order, then prune absent identifiers.
///
/// A conversion error stops processing immediately: records already upserted
/// stay, remaining items are skipped, and nothing is pruned.
pub(crate) fn reconcile_by_absence<T, A>(
    collection: &EntityCollection<T>,
    items: Vec<A>,
    mut convert: impl FnMut(A) -> Result<(DocumentId, T), CoreError>,
) -> Result<SyncReport, CoreError>
where
    T: Clone + Send + Sync + 'static,
{
    let mut report = SyncReport {
        fetched: items.len(),
        ..SyncReport::default()
    };

    let mut seen: HashSet<DocumentId> = HashSet::with_capacity(items.len());
    for item in items {
        let (id, entity) = convert(item)?;
        seen.insert(id.clone());
        if collection.upsert(id, entity) {
            report.inserted += 1;
        } else {
            report.updated += 1;
        }
    }

    for existing in collection.ids() {
        if !seen.contains(&existing) && collection.remove(&existing).is_some() {
            report.removed += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pair(s: &str) -> Result<(DocumentId, String), CoreError> {
        Ok((DocumentId::from(s), s.to_uppercase()))
    }

    #[test]
    fn absent_records_are_pruned() {
        let col: EntityCollection<String> = EntityCollection::new();
        for id in ["a", "b", "c"] {
            col.upsert(DocumentId::from(id), id.into());
        }

        let report = reconcile_by_absence(&col, vec!["a", "b"], pair).unwrap();

        let mut ids = col.ids();
        ids.sort();
        assert_eq!(ids, vec![DocumentId::from("a"), DocumentId::from("b")]);
        assert_eq!(report.updated, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(*col.get(&DocumentId::from("a")).unwrap(), "A");
    }

    #[test]
    fn empty_listing_clears_collection() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(DocumentId::from("a"), "a".into());

        let report = reconcile_by_absence(&col, Vec::<&str>::new(), pair).unwrap();
        assert!(col.is_empty());
        assert_eq!(report.removed, 1);
    }

    #[test]
    fn conversion_error_skips_pruning() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert(DocumentId::from("old"), "old".into());

        let result = reconcile_by_absence(&col, vec!["new", "bad", "later"], |s| {
            if s == "bad" {
                Err(CoreError::Protocol {
                    message: "bad document".into(),
                })
            } else {
                pair(s)
            }
        });

        assert!(result.is_err());
        assert!(col.contains(&DocumentId::from("old")));
        assert!(col.contains(&DocumentId::from("new")));
        assert!(!col.contains(&DocumentId::from("later")));
    }
}
