// ── Detail controllers ──
//
// Holds the record being shown in a detail view and derives the flags the
// view uses to enable its actions.

use crate::data::EditableEntity;
use crate::model::{RepositoryInfo, RepositoryStatus};
use crate::store::{EditSession, RecordStatus};

/// The edit session bound to one detail view, plus its busy flag.
pub struct DetailController<E> {
    session: Option<EditSession<E>>,
    busy: bool,
}

impl<E> Default for DetailController<E> {
    fn default() -> Self {
        Self {
            session: None,
            busy: false,
        }
    }
}

impl<E: EditableEntity> DetailController<E> {
    pub(crate) fn bind(&mut self, session: EditSession<E>) {
        self.session = Some(session);
    }

    pub(crate) fn take(&mut self) -> Option<EditSession<E>> {
        self.session.take()
    }

    pub(crate) fn session(&self) -> Option<&EditSession<E>> {
        self.session.as_ref()
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn record(&self) -> Option<&E> {
        self.session.as_ref().map(EditSession::record)
    }

    pub fn status(&self) -> Option<RecordStatus> {
        self.session.as_ref().map(EditSession::status)
    }

    /// Apply an edit to the bound record. `None` if nothing is bound.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        self.session.as_mut().map(|s| s.update(f))
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_creating(&self) -> bool {
        self.status() == Some(RecordStatus::ReadyNew)
    }

    /// There are unsaved changes and no request is in flight.
    pub fn can_save(&self) -> bool {
        !self.busy && self.status().is_some_and(|s| s != RecordStatus::ReadyClean)
    }

    fn is_clean_and_idle(&self) -> bool {
        !self.busy && self.status() == Some(RecordStatus::ReadyClean)
    }
}

impl DetailController<RepositoryInfo> {
    fn current_status(&self) -> Option<RepositoryStatus> {
        self.record().and_then(|r| r.current_status)
    }

    pub fn can_bring_online(&self) -> bool {
        self.is_clean_and_idle() && self.current_status() != Some(RepositoryStatus::Online)
    }

    pub fn can_make_read_only(&self) -> bool {
        self.is_clean_and_idle() && self.current_status() != Some(RepositoryStatus::ReadOnly)
    }

    pub fn can_take_offline(&self) -> bool {
        self.is_clean_and_idle() && self.current_status() != Some(RepositoryStatus::Offline)
    }

    /// Only offline repositories can be removed.
    pub fn can_remove(&self) -> bool {
        self.is_clean_and_idle() && self.current_status() == Some(RepositoryStatus::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentId;

    fn bound(status: Option<RepositoryStatus>) -> DetailController<RepositoryInfo> {
        let mut detail = DetailController::default();
        detail.bind(EditSession::existing(RepositoryInfo {
            id: Some(DocumentId::from("r1")),
            version: 2,
            name: "sandpit".into(),
            current_status: status,
            ..RepositoryInfo::default()
        }));
        detail
    }

    #[test]
    fn nothing_bound_allows_nothing() {
        let detail: DetailController<RepositoryInfo> = DetailController::default();
        assert!(!detail.can_save());
        assert!(!detail.is_creating());
        assert!(!detail.can_remove());
        assert!(!detail.can_bring_online());
    }

    #[test]
    fn clean_online_repository_flags() {
        let detail = bound(Some(RepositoryStatus::Online));
        assert!(!detail.can_save());
        assert!(!detail.can_bring_online());
        assert!(detail.can_make_read_only());
        assert!(detail.can_take_offline());
        assert!(!detail.can_remove());
    }

    #[test]
    fn offline_repository_can_be_removed() {
        let detail = bound(Some(RepositoryStatus::Offline));
        assert!(detail.can_remove());
        assert!(detail.can_bring_online());
        assert!(!detail.can_take_offline());
    }

    #[test]
    fn dirty_record_can_save_but_not_change_status() {
        let mut detail = bound(Some(RepositoryStatus::Offline));
        detail.update(|r| r.description = Some("changed".into()));
        assert!(detail.can_save());
        assert!(!detail.can_remove());
        assert!(!detail.can_bring_online());
    }

    #[test]
    fn busy_blocks_everything() {
        let mut detail = bound(Some(RepositoryStatus::Offline));
        detail.update(|r| r.max_keywords = 5);
        detail.set_busy(true);
        assert!(!detail.can_save());
        assert!(!detail.can_remove());
    }

    #[test]
    fn new_record_is_creating() {
        let mut detail: DetailController<RepositoryInfo> = DetailController::default();
        detail.bind(EditSession::new_record(RepositoryInfo::default()));
        assert!(detail.is_creating());
        assert!(detail.can_save());
        assert!(!detail.can_take_offline());
    }
}
