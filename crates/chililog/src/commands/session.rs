//! Session command handlers: login, logout, whoami, sync, watch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use chililog_config as shared;
use chililog_core::{Console, CoreError, SyncOutcome};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::{Connection, repos, util};

// ── Login / logout ──────────────────────────────────────────────────

pub async fn login(conn: &Connection, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = &conn.target.profile_name;
    let profile = conn.target.profile.as_ref();

    let username = match args.username {
        Some(u) => u,
        None => match profile.map(|p| shared::resolve_username(p, name)) {
            Some(Ok(u)) => u,
            _ => Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(util::prompt_err)?,
        },
    };
    let password = match profile.map(|p| shared::resolve_password(p, name)) {
        Some(Ok(pw)) => pw,
        _ => util::prompt_password("Password: ")?,
    };

    let spin = output::spinner(global, "Logging in");
    let result = conn
        .console
        .login(&username, &password, !args.no_remember)
        .await;
    spin.finish_and_clear();
    let user = result?;

    output::notice(
        global,
        &format!(
            "Logged in as {} on {}",
            user.display_name_or_username(),
            conn.target.console.url
        ),
    );
    Ok(())
}

pub async fn logout(conn: &Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let was_logged_in = match conn.console.load().await {
        Ok(restored) => restored,
        Err(e) => {
            warn!(error = %e, "could not restore session before logout");
            false
        }
    };
    conn.console.logout().await;
    output::notice(
        global,
        if was_logged_in {
            "Logged out"
        } else {
            "Not logged in; remembered session cleared"
        },
    );
    Ok(())
}

// ── Whoami ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct WhoAmI {
    username: String,
    display_name: String,
    email_address: Option<String>,
    roles: Vec<String>,
    system_administrator: bool,
    server: String,
    server_version: Option<String>,
    server_build_timestamp: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    gravatar_url: Option<String>,
}

fn whoami_detail(w: &WhoAmI) -> String {
    output::detail_lines(&[
        ("User", format!("{} ({})", w.display_name, w.username)),
        ("Email", w.email_address.clone().unwrap_or_default()),
        ("Roles", w.roles.join(", ")),
        (
            "Administrator",
            if w.system_administrator { "yes" } else { "no" }.into(),
        ),
        ("Server", w.server.clone()),
        ("Version", w.server_version.clone().unwrap_or_default()),
        ("Built", w.server_build_timestamp.clone().unwrap_or_default()),
        (
            "Expires",
            w.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
    ])
}

pub fn whoami(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let session = console.session();
    let user = session
        .authenticated_user()
        .ok_or(CoreError::NotAuthenticated)?;
    let server = session.server_info();

    let info = WhoAmI {
        username: user.username.clone(),
        display_name: user.display_name_or_username().to_owned(),
        email_address: user.email_address.clone(),
        roles: user.roles.clone(),
        system_administrator: session.is_system_administrator(),
        server: console.config().url.to_string(),
        server_version: server.as_ref().map(|s| s.version.clone()),
        server_build_timestamp: server.map(|s| s.build_timestamp),
        expires_at: session.expires_at(),
        gravatar_url: session.gravatar_url(),
    };
    let out = output::render_single(&global.output, &info, whoami_detail, |w| {
        w.username.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Sync ────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct SyncRow {
    #[tabled(rename = "Data")]
    data: &'static str,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Fetched")]
    fetched: String,
    #[tabled(rename = "Added")]
    inserted: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Removed")]
    removed: String,
}

fn sync_row(data: &'static str, outcome: &Result<SyncOutcome, CoreError>) -> SyncRow {
    let (result, report) = match outcome {
        Ok(SyncOutcome::Completed(report)) => ("synchronized".to_owned(), Some(report)),
        Ok(SyncOutcome::Skipped) => ("skipped (already running)".to_owned(), None),
        Err(e) => (format!("failed: {e}"), None),
    };
    let count = |f: fn(&chililog_core::SyncReport) -> usize| {
        report.map_or_else(|| "-".to_owned(), |r| f(r).to_string())
    };
    SyncRow {
        data,
        result,
        fetched: count(|r| r.fetched),
        inserted: count(|r| r.inserted),
        updated: count(|r| r.updated),
        removed: count(|r| r.removed),
    }
}

pub async fn sync(console: &Console, clear: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let spin = output::spinner(global, "Synchronizing");
    let summary = console.synchronize_server_data(clear).await;
    spin.finish_and_clear();

    let rows = [
        sync_row("repository status", &summary.repositories),
        sync_row("repositories", &summary.repository_info),
        sync_row("users", &summary.users),
    ];
    let out = output::render_list(
        &global.output,
        &rows,
        SyncRow::clone,
        |r| format!("{}\t{}", r.data, r.result),
    )?;
    output::print_output(&out, global.quiet);

    summary.into_result()?;
    Ok(())
}

// ── Watch ───────────────────────────────────────────────────────────

/// Reprint the repository table whenever it changes, refreshing from the
/// server every `interval` seconds. Ends on Ctrl-C or when the session
/// expires.
pub async fn watch(console: &Console, interval: u64, global: &GlobalOpts) -> Result<(), CliError> {
    console.start_expiry_watch().await;

    let mut repositories = console.repository_info().subscribe();
    let mut user = console.store().subscribe_authenticated_user();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));
    ticker.tick().await; // consume the immediate first tick

    let mut last = repos::render_repository_list(console, global)?;
    output::print_output(&last, global.quiet);

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = user.changed() => {
                if changed.is_err() || user.borrow().is_none() {
                    output::notice(global, "Session expired");
                    return Err(CoreError::NotAuthenticated.into());
                }
            }
            snapshot = repositories.changed() => {
                if snapshot.is_none() {
                    break;
                }
                let rendered = repos::render_repository_list(console, global)?;
                if rendered != last {
                    output::print_output(&rendered, global.quiet);
                    last = rendered;
                }
            }
            _ = ticker.tick() => {
                let summary = console.synchronize_server_data(false).await;
                if let Some(e) = summary.first_error() {
                    warn!(error = %e, "refresh failed (non-fatal)");
                }
            }
        }
    }
    Ok(())
}
