// ── Console facade ──
//
// Owns the API client, the local store, the session controller, and one
// data controller per document type. Constructed once and shared by clone.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chililog_api::ApiClient;

use crate::config::ConsoleConfig;
use crate::data::{DataController, SyncOutcome};
use crate::error::CoreError;
use crate::model::{AuthenticatedUser, Repository, RepositoryInfo, User};
use crate::session::{SessionController, SessionState};
use crate::store::{EditSession, LocalStore};
use crate::token_store::TokenStore;

/// Per-type results of [`Console::synchronize_server_data`].
#[derive(Debug)]
pub struct SyncSummary {
    pub repositories: Result<SyncOutcome, CoreError>,
    pub repository_info: Result<SyncOutcome, CoreError>,
    pub users: Result<SyncOutcome, CoreError>,
}

impl SyncSummary {
    pub fn is_ok(&self) -> bool {
        self.first_error().is_none()
    }

    pub fn first_error(&self) -> Option<&CoreError> {
        [&self.repositories, &self.repository_info, &self.users]
            .into_iter()
            .find_map(|r| r.as_ref().err())
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<(), CoreError> {
        self.repositories?;
        self.repository_info?;
        self.users?;
        Ok(())
    }
}

/// Entry point for everything the administration console does.
///
/// Cheaply cloneable; all clones share one store and one session.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    client: ApiClient,
    store: Arc<LocalStore>,
    state: Arc<SessionState>,
    session: SessionController,
    repositories: DataController<Repository>,
    repository_info: DataController<RepositoryInfo>,
    users: DataController<User>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Console {
    /// Build a console for the configured server. Does not contact it:
    /// call [`load`](Self::load) or [`login`](Self::login).
    pub fn new(config: ConsoleConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        let client = ApiClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client, tokens))
    }

    /// Build a console around an existing API client.
    pub fn with_client(config: ConsoleConfig, client: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let store = Arc::new(LocalStore::new());
        let state = Arc::new(SessionState::new());

        let session = SessionController::new(
            client.clone(),
            Arc::clone(&store),
            Arc::clone(&state),
            tokens,
            config.token_expiry,
            config.expiry_check_interval,
        );
        let repositories =
            DataController::new(client.clone(), Arc::clone(&store), Arc::clone(&state));
        let repository_info =
            DataController::new(client.clone(), Arc::clone(&store), Arc::clone(&state));
        let users = DataController::new(client.clone(), Arc::clone(&store), Arc::clone(&state));

        Self {
            inner: Arc::new(ConsoleInner {
                config,
                client,
                store,
                state,
                session,
                repositories,
                repository_info,
                users,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.inner.store
    }

    pub fn session(&self) -> &SessionController {
        &self.inner.session
    }

    pub fn repositories(&self) -> &DataController<Repository> {
        &self.inner.repositories
    }

    pub fn repository_info(&self) -> &DataController<RepositoryInfo> {
        &self.inner.repository_info
    }

    pub fn users(&self) -> &DataController<User> {
        &self.inner.users
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Restore a remembered session and, if that worked, fetch all data.
    /// Local data from any earlier session is dropped first, whatever the
    /// outcome. Synchronization failures are logged, not returned.
    pub async fn load(&self) -> Result<bool, CoreError> {
        self.clear_local_data();
        let restored = self.inner.session.load().await?;
        if restored {
            self.initial_synchronization().await;
        }
        Ok(restored)
    }

    /// Log in, then replace all local data with the server's. Local data
    /// from the previous session is dropped even if the login fails.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        remember_me: bool,
    ) -> Result<AuthenticatedUser, CoreError> {
        self.clear_local_data();
        let user = self
            .inner
            .session
            .login(username, password, remember_me)
            .await?;
        self.initial_synchronization().await;
        Ok(user)
    }

    async fn initial_synchronization(&self) {
        let summary = self.synchronize_server_data(true).await;
        if let Some(e) = summary.first_error() {
            warn!(error = %e, "initial synchronization incomplete");
        }
    }

    /// End the session on the server (best effort), then forget it locally
    /// and drop every local document.
    pub async fn logout(&self) {
        if let Some(token) = self.inner.state.token() {
            if let Err(e) = self.inner.client.end_session(&token).await {
                warn!(error = %e, "server logout failed (non-fatal)");
            }
        }
        self.inner.session.logout();
        self.clear_local_data();
    }

    pub fn clear_local_data(&self) {
        self.inner.repositories.clear_local_data();
        self.inner.repository_info.clear_local_data();
        self.inner.users.clear_local_data();
    }

    /// Synchronize every document type: repository runtime first so that
    /// repository configurations link to current status, then repository
    /// configurations, then users. Each failure is logged by its controller
    /// and does not stop the others.
    pub async fn synchronize_server_data(&self, clear_local_data: bool) -> SyncSummary {
        let repositories = self
            .inner
            .repositories
            .synchronize_with_server(clear_local_data)
            .await;
        let repository_info = self
            .inner
            .repository_info
            .synchronize_with_server(clear_local_data)
            .await;
        let users = self
            .inner
            .users
            .synchronize_with_server(clear_local_data)
            .await;

        let summary = SyncSummary {
            repositories,
            repository_info,
            users,
        };
        debug!(ok = summary.is_ok(), "server data synchronized");
        summary
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Save the logged-in user's profile, then refresh the user list so
    /// it reflects the change.
    pub async fn save_profile(
        &self,
        session: &EditSession<AuthenticatedUser>,
    ) -> Result<AuthenticatedUser, CoreError> {
        let saved = self.inner.session.save_profile(session).await?;
        if let Err(e) = self.inner.users.synchronize_with_server(false).await {
            warn!(error = %e, "user refresh after profile save failed");
        }
        Ok(saved)
    }

    // ── Background tasks ─────────────────────────────────────────────

    /// Poll for session expiry every `expiry_check_interval` until
    /// [`shutdown`](Self::shutdown). An expired session is logged out and
    /// local data cleared.
    pub async fn start_expiry_watch(&self) {
        let console = self.clone();
        let interval = self.inner.config.expiry_check_interval;
        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(expiry_watch_task(console, interval, cancel));
        self.inner.task_handles.lock().await.push(handle);
        debug!(?interval, "session expiry watch started");
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("console shut down");
    }

    /// Log out and clear data if the session is about to expire.
    pub fn check_expiry(&self) -> bool {
        if self.inner.session.check_expiry(Utc::now()) {
            self.clear_local_data();
            info!("local data cleared after session expiry");
            true
        } else {
            false
        }
    }
}

async fn expiry_watch_task(console: Console, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                console.check_expiry();
            }
        }
    }
}
