//! Shared helpers for command handlers.

use std::io::IsTerminal;

use secrecy::SecretString;

use chililog_core::{Console, DocumentId, Navigator};

use crate::error::CliError;

/// Resolve a repository name or document ID against the local store.
pub fn resolve_repository(console: &Console, identifier: &str) -> Result<DocumentId, CliError> {
    let by_id = DocumentId::from(identifier);
    if console.repository_info().get(&by_id).is_some() {
        return Ok(by_id);
    }
    console
        .store()
        .find_repository_info_by_name(identifier)
        .and_then(|r| r.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "repository".into(),
            identifier: identifier.into(),
            list_command: "repos list".into(),
        })
}

/// Resolve a username or document ID against the local store.
pub fn resolve_user(console: &Console, identifier: &str) -> Result<DocumentId, CliError> {
    let by_id = DocumentId::from(identifier);
    if console.users().get(&by_id).is_some() {
        return Ok(by_id);
    }
    console
        .store()
        .users()
        .find(|u| u.username.eq_ignore_ascii_case(identifier))
        .and_then(|u| u.id.clone())
        .ok_or_else(|| CliError::NotFound {
            resource_type: "user".into(),
            identifier: identifier.into(),
            list_command: "users list".into(),
        })
}

/// Surface the error a navigator recorded while handling the last event.
pub fn navigator_result(nav: &mut Navigator) -> Result<(), CliError> {
    match nav.take_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Read a password without echo. Empty input is rejected.
pub fn prompt_password(prompt: &str) -> Result<SecretString, CliError> {
    let value = rpassword::prompt_password(prompt)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(value))
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Render an optional string for table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or("-").to_owned()
}
