// ── Navigation states and transition table ──
//
// The table is a pure function of (state, event). Side effects of entering
// and leaving states live in `Navigator`.

use std::fmt;

use crate::model::{DocumentId, RepositoryStatus};

/// Which document list the console is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Repositories,
    Users,
}

impl Section {
    fn singular(self) -> &'static str {
        match self {
            Self::Repositories => "Repository",
            Self::Users => "User",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::Repositories => "Repositories",
            Self::Users => "Users",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Creating,
    Editing { document_id: DocumentId },
    /// `document_id` is `None` while a new record is being saved.
    Saving { document_id: Option<DocumentId> },
    Erasing { document_id: DocumentId },
    /// Repositories only.
    ChangingStatus {
        document_id: DocumentId,
        status: RepositoryStatus,
    },
}

impl Mode {
    /// Saving, erasing, and status changes wait on the server.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Saving { .. } | Self::Erasing { .. } | Self::ChangingStatus { .. }
        )
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            Self::Viewing | Self::Creating | Self::Saving { document_id: None } => None,
            Self::Editing { document_id }
            | Self::Saving {
                document_id: Some(document_id),
            }
            | Self::Erasing { document_id }
            | Self::ChangingStatus { document_id, .. } => Some(document_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub section: Section,
    pub mode: Mode,
}

impl State {
    pub fn new(section: Section, mode: Mode) -> Self {
        Self { section, mode }
    }

    pub fn viewing(section: Section) -> Self {
        Self::new(section, Mode::Viewing)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::viewing(Section::Repositories)
    }
}

/// `viewingRepositories`, `creatingUser`, `savingRepository`, ...
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let singular = self.section.singular();
        match self.mode {
            Mode::Viewing => write!(f, "viewing{}", self.section.plural()),
            Mode::Creating => write!(f, "creating{singular}"),
            Mode::Editing { .. } => write!(f, "editing{singular}"),
            Mode::Saving { .. } => write!(f, "saving{singular}"),
            Mode::Erasing { .. } => write!(f, "erasing{singular}"),
            Mode::ChangingStatus { .. } => write!(f, "changing{singular}Status"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ViewRepositories,
    ViewUsers,
    Create,
    Edit { document_id: DocumentId },
    Save,
    Erase { document_id: DocumentId },
    DiscardChanges,
    ChangeStatus { status: RepositoryStatus },

    // ── Completion events ──
    SaveSucceeded { document_id: DocumentId },
    SaveFailed,
    EraseSucceeded,
    EraseFailed { document_id: DocumentId },
    StatusChangeFinished,
}

/// Data carried across one transition to the exit and entry actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionContext {
    pub document_id: Option<DocumentId>,
    /// A save is proceeding: leaving the edit state must keep the edits.
    pub is_saving: bool,
    /// Re-entering an edit state after a failed save: do not reload.
    pub is_reedit: bool,
}

impl TransitionContext {
    fn document(document_id: &DocumentId) -> Self {
        Self {
            document_id: Some(document_id.clone()),
            ..Self::default()
        }
    }
}

/// Next state for `event`, or `None` if the current state ignores it.
pub fn transition(state: &State, event: &Event) -> Option<(State, TransitionContext)> {
    let section = state.section;
    let to = |mode| State::new(section, mode);

    match (&state.mode, event) {
        // ── Busy states accept only their completion events ──
        (Mode::Saving { .. }, Event::SaveSucceeded { document_id }) => Some((
            to(Mode::Editing {
                document_id: document_id.clone(),
            }),
            TransitionContext::document(document_id),
        )),
        (Mode::Saving { document_id }, Event::SaveFailed) => {
            let mode = match document_id {
                Some(id) => Mode::Editing {
                    document_id: id.clone(),
                },
                None => Mode::Creating,
            };
            Some((
                to(mode),
                TransitionContext {
                    document_id: document_id.clone(),
                    is_saving: false,
                    is_reedit: true,
                },
            ))
        }
        (Mode::Erasing { .. }, Event::EraseSucceeded) => {
            Some((to(Mode::Viewing), TransitionContext::default()))
        }
        (Mode::Erasing { .. }, Event::EraseFailed { document_id }) => Some((
            to(Mode::Editing {
                document_id: document_id.clone(),
            }),
            TransitionContext::document(document_id),
        )),
        (Mode::ChangingStatus { document_id, .. }, Event::StatusChangeFinished) => Some((
            to(Mode::Editing {
                document_id: document_id.clone(),
            }),
            TransitionContext::document(document_id),
        )),
        (mode, _) if mode.is_busy() => None,

        // ── Section selectors ──
        (_, Event::ViewRepositories) => Some((
            State::viewing(Section::Repositories),
            TransitionContext::default(),
        )),
        (_, Event::ViewUsers) => Some((State::viewing(Section::Users), TransitionContext::default())),

        // ── List and detail navigation ──
        (Mode::Viewing | Mode::Editing { .. }, Event::Create) => {
            Some((to(Mode::Creating), TransitionContext::default()))
        }
        (_, Event::Edit { document_id }) => Some((
            to(Mode::Editing {
                document_id: document_id.clone(),
            }),
            TransitionContext::document(document_id),
        )),
        (Mode::Viewing | Mode::Editing { .. }, Event::Erase { document_id }) => Some((
            to(Mode::Erasing {
                document_id: document_id.clone(),
            }),
            TransitionContext::document(document_id),
        )),
        (Mode::Creating | Mode::Editing { .. }, Event::DiscardChanges) => {
            Some((to(Mode::Viewing), TransitionContext::default()))
        }

        // ── Save ──
        (Mode::Creating, Event::Save) => Some((
            to(Mode::Saving { document_id: None }),
            TransitionContext {
                is_saving: true,
                ..TransitionContext::default()
            },
        )),
        (Mode::Editing { document_id }, Event::Save) => Some((
            to(Mode::Saving {
                document_id: Some(document_id.clone()),
            }),
            TransitionContext {
                document_id: Some(document_id.clone()),
                is_saving: true,
                is_reedit: false,
            },
        )),

        // ── Repository runtime status ──
        (Mode::Editing { document_id }, Event::ChangeStatus { status })
            if section == Section::Repositories =>
        {
            Some((
                to(Mode::ChangingStatus {
                    document_id: document_id.clone(),
                    status: *status,
                }),
                TransitionContext::document(document_id),
            ))
        }

        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> DocumentId {
        DocumentId::from(s)
    }

    fn editing(section: Section, doc: &str) -> State {
        State::new(section, Mode::Editing { document_id: id(doc) })
    }

    #[test]
    fn state_names() {
        assert_eq!(State::default().to_string(), "viewingRepositories");
        assert_eq!(
            State::new(Section::Users, Mode::Saving { document_id: None }).to_string(),
            "savingUser"
        );
        assert_eq!(
            State::new(Section::Users, Mode::Creating).to_string(),
            "creatingUser"
        );
        assert_eq!(editing(Section::Repositories, "r").to_string(), "editingRepository");
    }

    #[test]
    fn save_from_editing_carries_is_saving() {
        let (next, ctx) = transition(&editing(Section::Users, "u1"), &Event::Save).unwrap();
        assert_eq!(
            next.mode,
            Mode::Saving {
                document_id: Some(id("u1"))
            }
        );
        assert!(ctx.is_saving);
        assert!(!ctx.is_reedit);
    }

    #[test]
    fn failed_save_of_new_record_returns_to_creating_as_reedit() {
        let saving = State::new(Section::Repositories, Mode::Saving { document_id: None });
        let (next, ctx) = transition(&saving, &Event::SaveFailed).unwrap();
        assert_eq!(next.mode, Mode::Creating);
        assert!(ctx.is_reedit);
    }

    #[test]
    fn successful_save_goes_to_editing_new_id() {
        let saving = State::new(Section::Repositories, Mode::Saving { document_id: None });
        let (next, ctx) =
            transition(&saving, &Event::SaveSucceeded { document_id: id("new") }).unwrap();
        assert_eq!(next, editing(Section::Repositories, "new"));
        assert!(!ctx.is_reedit);
    }

    #[test]
    fn busy_states_ignore_navigation() {
        let saving = State::new(Section::Users, Mode::Saving { document_id: None });
        assert!(transition(&saving, &Event::ViewRepositories).is_none());
        assert!(transition(&saving, &Event::Create).is_none());
        assert!(transition(&saving, &Event::DiscardChanges).is_none());

        let erasing = State::new(Section::Users, Mode::Erasing { document_id: id("u") });
        assert!(transition(&erasing, &Event::Save).is_none());
    }

    #[test]
    fn erase_failure_returns_to_editing() {
        let erasing = State::new(Section::Users, Mode::Erasing { document_id: id("u") });
        let (next, _) =
            transition(&erasing, &Event::EraseFailed { document_id: id("u") }).unwrap();
        assert_eq!(next, editing(Section::Users, "u"));

        let (next, _) = transition(&erasing, &Event::EraseSucceeded).unwrap();
        assert_eq!(next, State::viewing(Section::Users));
    }

    #[test]
    fn unhandled_events_are_ignored() {
        let viewing = State::viewing(Section::Users);
        assert!(transition(&viewing, &Event::Save).is_none());
        assert!(transition(&viewing, &Event::DiscardChanges).is_none());
        assert!(transition(&viewing, &Event::SaveFailed).is_none());
        assert!(transition(&State::new(Section::Users, Mode::Creating), &Event::Create).is_none());
    }

    #[test]
    fn status_changes_only_for_repositories() {
        let event = Event::ChangeStatus {
            status: RepositoryStatus::Offline,
        };
        assert!(transition(&editing(Section::Users, "u"), &event).is_none());

        let (next, _) = transition(&editing(Section::Repositories, "r"), &event).unwrap();
        assert_eq!(next.to_string(), "changingRepositoryStatus");
    }

    #[test]
    fn section_selectors_switch_lists() {
        let (next, _) = transition(&editing(Section::Users, "u"), &Event::ViewRepositories).unwrap();
        assert_eq!(next, State::viewing(Section::Repositories));
    }
}
