// ── Session controller ──
//
// Token-based authentication against the Chililog server: login, restoring
// a remembered token, logout, expiry checks, and the logged-in user's own
// profile and password.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use chililog_api::models::{AuthenticatedUserAo, ExpiryType};
use chililog_api::{ApiClient, ServerInfo};

use crate::error::CoreError;
use crate::model::AuthenticatedUser;
use crate::store::{EditSession, LocalStore};
use crate::token_store::{TokenClaims, TokenStore};

/// An established session.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub server: ServerInfo,
}

/// Current authentication, shared between the session and data controllers.
#[derive(Default)]
pub struct SessionState {
    current: ArcSwapOption<Authentication>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn establish(&self, auth: Authentication) {
        self.current.store(Some(Arc::new(auth)));
    }

    pub(crate) fn clear(&self) {
        self.current.store(None);
    }

    pub fn current(&self) -> Option<Arc<Authentication>> {
        self.current.load_full()
    }

    /// Token to send with API requests, if logged in.
    pub fn token(&self) -> Option<SecretString> {
        self.current.load().as_ref().map(|a| a.token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.load().is_some()
    }
}

/// Login, logout, and the logged-in user's profile.
pub struct SessionController {
    client: ApiClient,
    store: Arc<LocalStore>,
    state: Arc<SessionState>,
    tokens: Arc<dyn TokenStore>,
    token_expiry: Duration,
    expiry_check_interval: Duration,
}

impl SessionController {
    pub(crate) fn new(
        client: ApiClient,
        store: Arc<LocalStore>,
        state: Arc<SessionState>,
        tokens: Arc<dyn TokenStore>,
        token_expiry: Duration,
        expiry_check_interval: Duration,
    ) -> Self {
        Self {
            client,
            store,
            state,
            tokens,
            token_expiry,
            expiry_check_interval,
        }
    }

    // ── Login / logout ───────────────────────────────────────────────

    /// Authenticate with username and password.
    ///
    /// Any existing session is logged out first. With `remember_me` the new
    /// token is persisted for [`load`](Self::load).
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        remember_me: bool,
    ) -> Result<AuthenticatedUser, CoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CoreError::validation("username", "Username is required"));
        }
        if password.expose_secret().is_empty() {
            return Err(CoreError::validation("password", "Password is required"));
        }

        self.logout();

        let auth = self
            .client
            .login(
                username,
                password,
                ExpiryType::Absolute,
                self.token_expiry.as_secs(),
            )
            .await?;
        let user = AuthenticatedUser::try_from(auth.user)?;
        let expires_at = expiry_from_now(self.token_expiry)?;

        if remember_me {
            self.tokens.save(&auth.token)?;
        }

        info!(
            username = %user.username,
            server_version = %auth.server.version,
            %expires_at,
            "logged in"
        );
        self.state.establish(Authentication {
            token: auth.token,
            expires_at,
            server: auth.server,
        });
        self.store.set_authenticated_user(Some(user.clone()));
        Ok(user)
    }

    /// Restore a remembered session.
    ///
    /// Returns `Ok(false)` when there is no stored token, the token is
    /// malformed or expired, or the server no longer accepts it.
    pub async fn load(&self) -> Result<bool, CoreError> {
        let stored = self.tokens.load()?;
        self.logout();

        let Some(token) = stored else {
            debug!("no stored token");
            return Ok(false);
        };
        let Some(claims) = TokenClaims::parse(&token) else {
            warn!("stored token is malformed, ignoring");
            return Ok(false);
        };
        if claims.is_expired_at(Utc::now()) {
            info!(expired_on = %claims.expires_on, "stored token has expired");
            return Ok(false);
        }

        let auth = match self.client.fetch_session(&token).await {
            Ok(auth) => auth,
            Err(e) => {
                let err = CoreError::from(e);
                if err.is_unauthorized() {
                    info!("server rejected stored token");
                    return Ok(false);
                }
                return Err(err);
            }
        };
        let user = AuthenticatedUser::try_from(auth.user)?;

        self.tokens.save(&token)?;
        info!(username = %user.username, expires_at = %claims.expires_on, "session restored");
        self.state.establish(Authentication {
            token,
            expires_at: claims.expires_on,
            server: auth.server,
        });
        self.store.set_authenticated_user(Some(user));
        Ok(true)
    }

    /// Forget the session locally: stored token, logged-in user, and token.
    pub fn logout(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to remove stored token (non-fatal)");
        }
        self.store.set_authenticated_user(None);
        if self.state.is_logged_in() {
            self.state.clear();
            info!("logged out");
        }
    }

    /// `true` once `now` is within one check interval of the token expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let Some(auth) = self.state.current() else {
            return false;
        };
        let margin = TimeDelta::from_std(self.expiry_check_interval).unwrap_or(TimeDelta::MAX);
        auth.expires_at
            .checked_sub_signed(margin)
            .is_none_or(|threshold| now > threshold)
    }

    /// Log out if the session is about to expire. Returns `true` if it did.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> bool {
        if !self.is_expired_at(now) {
            return false;
        }
        info!("session expired");
        self.logout();
        true
    }

    pub fn expiry_check_interval(&self) -> Duration {
        self.expiry_check_interval
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Start editing the logged-in user's profile.
    pub fn edit_profile(&self) -> Option<EditSession<AuthenticatedUser>> {
        let user = self.store.authenticated_user()?;
        Some(EditSession::existing((*user).clone()))
    }

    pub async fn save_profile(
        &self,
        session: &EditSession<AuthenticatedUser>,
    ) -> Result<AuthenticatedUser, CoreError> {
        let profile = session.record();
        if profile.username.trim().is_empty() {
            return Err(CoreError::validation("username", "Username is required"));
        }
        let token = self.token()?;

        let ao = AuthenticatedUserAo::from(profile);
        let saved = AuthenticatedUser::try_from(self.client.update_profile(&token, &ao).await?)?;
        if saved.id != profile.id {
            return Err(CoreError::Integrity {
                expected: profile.id.to_string(),
                actual: saved.id.to_string(),
            });
        }

        info!(username = %saved.username, "profile saved");
        self.store.set_authenticated_user(Some(saved.clone()));
        Ok(saved)
    }

    pub fn discard_profile_changes(&self, session: EditSession<AuthenticatedUser>) {
        debug!(session = %session.id(), "discarded profile changes");
        drop(session);
    }

    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        confirm_new_password: &SecretString,
    ) -> Result<(), CoreError> {
        if new_password.expose_secret().is_empty() {
            return Err(CoreError::validation(
                "new_password",
                "New password is required",
            ));
        }
        if new_password.expose_secret() != confirm_new_password.expose_secret() {
            return Err(CoreError::validation(
                "confirm_new_password",
                "Passwords do not match",
            ));
        }
        let token = self.token()?;
        let user = self
            .store
            .authenticated_user()
            .ok_or(CoreError::NotAuthenticated)?;

        let ao = self
            .client
            .change_password(
                &token,
                user.id.as_str(),
                old_password,
                new_password,
                confirm_new_password,
            )
            .await?;
        let updated = AuthenticatedUser::try_from(ao)?;
        info!(username = %updated.username, "password changed");
        self.store.set_authenticated_user(Some(updated));
        Ok(())
    }

    // ── Derived state ────────────────────────────────────────────────

    fn token(&self) -> Result<SecretString, CoreError> {
        self.state.token().ok_or(CoreError::NotAuthenticated)
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in()
    }

    pub fn authenticated_user(&self) -> Option<Arc<AuthenticatedUser>> {
        self.store.authenticated_user()
    }

    pub fn server_info(&self) -> Option<ServerInfo> {
        self.state.current().map(|a| a.server.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.current().map(|a| a.expires_at)
    }

    pub fn logged_in_user_display_name(&self) -> Option<String> {
        self.authenticated_user()
            .map(|u| u.display_name_or_username().to_owned())
    }

    pub fn gravatar_url(&self) -> Option<String> {
        self.authenticated_user().and_then(|u| u.gravatar_url())
    }

    pub fn is_system_administrator(&self) -> bool {
        self.authenticated_user()
            .is_some_and(|u| u.is_system_administrator())
    }

    pub fn is_repository_administrator(&self) -> bool {
        self.authenticated_user()
            .is_some_and(|u| u.is_repository_administrator())
    }

    pub fn is_repository_administrator_of(&self, repository_name: &str) -> bool {
        self.authenticated_user()
            .is_some_and(|u| u.is_repository_administrator_of(repository_name))
    }
}

fn expiry_from_now(lifetime: Duration) -> Result<DateTime<Utc>, CoreError> {
    TimeDelta::from_std(lifetime)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .ok_or_else(|| CoreError::Config {
            message: format!("token expiry {lifetime:?} is out of range"),
        })
}
