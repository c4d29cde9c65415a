// ── Core error types ──
//
// User-facing errors from chililog-core. Consumers see the console's error
// taxonomy (connectivity, protocol, integrity, validation) rather than
// transport details. The `From<chililog_api::Error>` impl performs the
// translation.

use chililog_api::headers::{AUTHENTICATION_HEADER, BUILD_TIMESTAMP_HEADER, VERSION_HEADER};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connectivity ─────────────────────────────────────────────────
    /// Non-2xx response or unreachable server. `message` is the server's own
    /// message when it supplied one.
    #[error("{message}")]
    Connectivity { status: Option<u16>, message: String },

    // ── Protocol ─────────────────────────────────────────────────────
    /// The server response was missing a required header or was malformed.
    #[error("{message}")]
    Protocol { message: String },

    // ── Integrity ────────────────────────────────────────────────────
    /// The server echoed a different document identifier than requested.
    #[error("Document ID mismatch: expected '{expected}' but the server returned '{actual}'")]
    Integrity { expected: String, actual: String },

    // ── Client-side checks ───────────────────────────────────────────
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if the server rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
            || matches!(self, Self::Connectivity { status: Some(401), .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<chililog_api::Error> for CoreError {
    fn from(err: chililog_api::Error) -> Self {
        match err {
            chililog_api::Error::Http { status, message } => CoreError::Connectivity {
                status: Some(status),
                message,
            },
            chililog_api::Error::MissingHeader { name } => CoreError::Protocol {
                message: missing_header_message(name),
            },
            chililog_api::Error::Transport(e) => CoreError::Connectivity {
                status: e.status().map(|s| s.as_u16()),
                message: format!("Error connecting to server. {e}"),
            },
            chililog_api::Error::Tls(msg) => CoreError::Connectivity {
                status: None,
                message: format!("TLS error: {msg}"),
            },
            chililog_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            chililog_api::Error::Deserialization { message, body: _ } => CoreError::Protocol {
                message: format!("Unexpected response from server: {message}"),
            },
        }
    }
}

fn missing_header_message(name: &str) -> String {
    match name {
        AUTHENTICATION_HEADER => "Token not found in authentication response".into(),
        VERSION_HEADER => "Version number not found in response".into(),
        BUILD_TIMESTAMP_HEADER => "Build timestamp not found in response".into(),
        other => format!("{other} header not found in response"),
    }
}
