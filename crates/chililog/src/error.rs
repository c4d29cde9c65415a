//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use chililog_config::ConfigError;
use chililog_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(chililog::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    Connection { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(chililog::server_error),
        help("The server rejected the request (HTTP {status}).")
    )]
    Server { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(chililog::protocol),
        help("The server did not answer like a Chililog server. Check the server URL.")
    )]
    Protocol { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(chililog::auth_failed),
        help("Log in again with: chililog login --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("Not logged in to profile '{profile}'")]
    #[diagnostic(
        code(chililog::not_logged_in),
        help(
            "Run: chililog login --profile {profile}\n\
             Or configure a username and password for the profile."
        )
    )]
    NotLoggedIn { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(chililog::not_found),
        help("Run: chililog {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(chililog::integrity),
        help("Local data may be stale. Run: chililog sync --clear")
    )]
    Integrity { message: String },

    #[error("{message}")]
    #[diagnostic(code(chililog::precondition))]
    Precondition { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(chililog::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(chililog::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: chililog config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(chililog::no_config),
        help(
            "Create a profile with: chililog config init\n\
             Or pass --server. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(chililog::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(chililog::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Everything else ──────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(chililog::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection { .. } | Self::Server { .. } | Self::Protocol { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. }
            | Self::NotLoggedIn { .. }
            | Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Integrity { .. } | Self::Precondition { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(ConfigError::Validation { .. } | ConfigError::UnknownProfile { .. }) => {
                exit_code::USAGE
            }
            Self::Config(_) | Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the active profile to authentication failures.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            Self::NotLoggedIn { .. } => Self::NotLoggedIn {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Connectivity {
                status: Some(401),
                message,
            } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },
            CoreError::Connectivity {
                status: Some(status),
                message,
            } => CliError::Server { status, message },
            CoreError::Connectivity {
                status: None,
                message,
            } => CliError::Connection { message },

            CoreError::Protocol { message } => CliError::Protocol { message },

            e @ CoreError::Integrity { .. } => CliError::Integrity {
                message: e.to_string(),
            },

            CoreError::Validation { field, message } => CliError::Validation {
                field: field.into(),
                reason: message,
            },

            CoreError::NotAuthenticated => CliError::NotLoggedIn {
                profile: "default".into(),
            },

            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command(entity).into(),
                resource_type: entity.to_lowercase(),
                identifier,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

fn list_command(entity: &str) -> &'static str {
    if entity.starts_with("User") {
        "users list"
    } else {
        "repos list"
    }
}
