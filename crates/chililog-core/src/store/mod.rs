// ── Reactive local store ──
//
// Canonical document storage with push-based change notification, plus
// the copy-on-write edit sessions used to modify records.

mod collection;
mod edit_session;
mod local_store;
pub(crate) mod reconcile;

pub use collection::EntityCollection;
pub use edit_session::{EditSession, RecordStatus};
pub use local_store::LocalStore;
pub use reconcile::SyncReport;
