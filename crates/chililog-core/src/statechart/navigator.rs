// ── Navigator ──
//
// Drives the navigation state machine: applies the transition table, runs
// exit and entry actions, and feeds completion events from saves, erases,
// and status changes back into the machine.

use tracing::{debug, info, warn};

use super::detail::DetailController;
use super::state::{Event, Mode, Section, State, TransitionContext, transition};
use crate::console::Console;
use crate::data::Entity;
use crate::error::CoreError;
use crate::model::{DocumentId, RepositoryInfo, User};

/// Navigation state for one console view, with a detail controller per
/// section.
pub struct Navigator {
    console: Console,
    state: State,
    repository: DetailController<RepositoryInfo>,
    user: DetailController<User>,
    last_error: Option<CoreError>,
    last_saved: Option<DocumentId>,
}

impl Navigator {
    /// Starts in `viewingRepositories`.
    pub fn new(console: Console) -> Self {
        Self {
            console,
            state: State::default(),
            repository: DetailController::default(),
            user: DetailController::default(),
            last_error: None,
            last_saved: None,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn repository(&self) -> &DetailController<RepositoryInfo> {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut DetailController<RepositoryInfo> {
        &mut self.repository
    }

    pub fn user(&self) -> &DetailController<User> {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut DetailController<User> {
        &mut self.user
    }

    /// Error from the most recent save, erase, or status change.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<CoreError> {
        self.last_error.take()
    }

    /// Identifier of the record saved by the most recent successful save.
    pub fn last_saved(&self) -> Option<&DocumentId> {
        self.last_saved.as_ref()
    }

    /// Deliver an event. Returns `false` if the current state ignored it.
    ///
    /// Completion events raised by entry actions are processed before this
    /// returns, so after `send(Event::Save)` the machine is back in an
    /// editing state.
    pub async fn send(&mut self, event: Event) -> bool {
        let mut pending = Some(event);
        let mut handled = false;

        while let Some(event) = pending.take() {
            let Some((next, ctx)) = transition(&self.state, &event) else {
                debug!(state = %self.state, ?event, "event ignored");
                break;
            };
            handled = true;

            self.exit(&ctx);
            debug!(from = %self.state, to = %next, "transition");
            self.state = next;
            pending = self.enter(&ctx).await;
        }

        handled
    }

    // ── Exit actions ─────────────────────────────────────────────────

    fn exit(&mut self, ctx: &TransitionContext) {
        let section = self.state.section;
        match self.state.mode {
            Mode::Creating | Mode::Editing { .. } => {
                if !ctx.is_saving && !ctx.is_reedit {
                    self.discard(section);
                }
            }
            Mode::Saving { .. } | Mode::Erasing { .. } | Mode::ChangingStatus { .. } => {
                self.set_busy(section, false);
            }
            Mode::Viewing => {}
        }
    }

    fn discard(&mut self, section: Section) {
        match section {
            Section::Repositories => {
                if let Some(session) = self.repository.take() {
                    self.console.repository_info().discard_changes(session);
                }
            }
            Section::Users => {
                if let Some(session) = self.user.take() {
                    self.console.users().discard_changes(session);
                }
            }
        }
    }

    fn set_busy(&mut self, section: Section, busy: bool) {
        match section {
            Section::Repositories => self.repository.set_busy(busy),
            Section::Users => self.user.set_busy(busy),
        }
    }

    // ── Entry actions ────────────────────────────────────────────────

    async fn enter(&mut self, ctx: &TransitionContext) -> Option<Event> {
        let section = self.state.section;
        match self.state.mode.clone() {
            Mode::Viewing => None,
            Mode::Creating => {
                if !ctx.is_reedit {
                    self.last_saved = None;
                    match section {
                        Section::Repositories => {
                            self.repository.bind(self.console.repository_info().create());
                        }
                        Section::Users => self.user.bind(self.console.users().create()),
                    }
                }
                None
            }
            Mode::Editing { document_id } => {
                if ctx.is_reedit {
                    return None;
                }
                if self.load_for_edit(section, &document_id) {
                    None
                } else {
                    warn!(%document_id, state = %self.state, "record not found, returning to list");
                    self.last_error = Some(CoreError::NotFound {
                        entity: match section {
                            Section::Repositories => RepositoryInfo::KIND,
                            Section::Users => User::KIND,
                        },
                        identifier: document_id.to_string(),
                    });
                    Some(Event::DiscardChanges)
                }
            }
            Mode::Saving { .. } => Some(self.save(section).await),
            Mode::Erasing { document_id } => Some(self.erase(section, document_id).await),
            Mode::ChangingStatus {
                document_id,
                status,
            } => {
                self.repository.set_busy(true);
                self.last_error = None;
                if let Err(e) = self
                    .console
                    .repositories()
                    .change_status(&document_id, status)
                    .await
                {
                    warn!(%document_id, %status, error = %e, "status change failed");
                    self.last_error = Some(e);
                }
                Some(Event::StatusChangeFinished)
            }
        }
    }

    fn load_for_edit(&mut self, section: Section, document_id: &DocumentId) -> bool {
        match section {
            Section::Repositories => match self.console.repository_info().edit(document_id) {
                Some(session) => {
                    self.repository.bind(session);
                    true
                }
                None => false,
            },
            Section::Users => match self.console.users().edit(document_id) {
                Some(session) => {
                    self.user.bind(session);
                    true
                }
                None => false,
            },
        }
    }

    async fn save(&mut self, section: Section) -> Event {
        self.set_busy(section, true);
        self.last_error = None;
        self.last_saved = None;

        let result = match section {
            Section::Repositories => match self.repository.session() {
                Some(session) => self.console.repository_info().save(session).await,
                None => Err(nothing_to_save()),
            },
            Section::Users => match self.user.session() {
                Some(session) => self.console.users().save(session).await,
                None => Err(nothing_to_save()),
            },
        };

        match result {
            Ok(document_id) => {
                info!(%document_id, state = %self.state, "save succeeded");
                self.last_saved = Some(document_id.clone());
                Event::SaveSucceeded { document_id }
            }
            Err(e) => {
                warn!(error = %e, state = %self.state, "save failed");
                self.last_error = Some(e);
                Event::SaveFailed
            }
        }
    }

    async fn erase(&mut self, section: Section, document_id: DocumentId) -> Event {
        self.set_busy(section, true);
        self.last_error = None;

        let result = match section {
            Section::Repositories => self.console.repository_info().erase(&document_id).await,
            Section::Users => self.console.users().erase(&document_id).await,
        };

        match result {
            Ok(()) => Event::EraseSucceeded,
            Err(e) => {
                warn!(%document_id, error = %e, "erase failed");
                self.last_error = Some(e);
                Event::EraseFailed { document_id }
            }
        }
    }
}

fn nothing_to_save() -> CoreError {
    CoreError::Internal("no record is bound for saving".into())
}
