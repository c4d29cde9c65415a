//! Command dispatch: bridges CLI args -> core console -> output formatting.

pub mod config_cmd;
pub mod profile;
pub mod repos;
pub mod session;
pub mod users;
pub mod util;

use std::sync::Arc;

use chililog_config as shared;
use chililog_core::{Console, FileTokenStore};

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Target};
use crate::error::CliError;
use crate::output;

/// A console bound to the active profile's server and token file.
pub struct Connection {
    pub console: Console,
    pub target: Target,
}

impl Connection {
    pub fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let target = config::resolve_target(global, shared::load_config()?)?;
        let tokens = Arc::new(FileTokenStore::new(shared::token_path(&target.profile_name)));
        let console = Console::new(target.console.clone(), tokens)?;
        Ok(Self { console, target })
    }

    /// Restore the remembered session, falling back to the profile's
    /// configured credentials.
    pub async fn ensure_logged_in(&self, global: &GlobalOpts) -> Result<(), CliError> {
        let spin = output::spinner(global, "Restoring session");
        let restored = self.console.load().await;
        spin.finish_and_clear();
        if restored? {
            return Ok(());
        }

        let not_logged_in = || CliError::NotLoggedIn {
            profile: self.target.profile_name.clone(),
        };
        let profile = self.target.profile.as_ref().ok_or_else(not_logged_in)?;
        let name = &self.target.profile_name;
        let (Ok(username), Ok(password)) = (
            shared::resolve_username(profile, name),
            shared::resolve_password(profile, name),
        ) else {
            return Err(not_logged_in());
        };

        tracing::debug!(profile = %name, "logging in with configured credentials");
        let spin = output::spinner(global, "Logging in");
        let result = self.console.login(&username, &password, false).await;
        spin.finish_and_clear();
        result?;
        Ok(())
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = Connection::open(global)?;
    let profile_name = conn.target.profile_name.clone();

    let result = match cmd {
        Command::Login(args) => session::login(&conn, args, global).await,
        Command::Logout => session::logout(&conn, global).await,
        cmd => run_logged_in(cmd, &conn, global).await,
    };
    conn.console.shutdown().await;
    result.map_err(|e| e.for_profile(&profile_name))
}

async fn run_logged_in(cmd: Command, conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    conn.ensure_logged_in(global).await?;
    match cmd {
        Command::Whoami => session::whoami(&conn.console, global),
        Command::Sync { clear } => session::sync(&conn.console, clear, global).await,
        Command::Watch { interval } => session::watch(&conn.console, interval, global).await,
        Command::Repos(args) => repos::handle(&conn.console, args, global).await,
        Command::Users(args) => users::handle(&conn.console, args, global).await,
        Command::Profile(args) => profile::handle(&conn.console, args, global).await,
        // Handled before a connection is opened
        Command::Login(_) | Command::Logout | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal("command dispatched twice".into()))
        }
    }
}
