// ── Runtime console configuration ──
//
// Describes *how* to reach a Chililog server and how sessions age.
// Never touches disk: the CLI builds a `ConsoleConfig` from its profile
// and hands it in.

use std::time::Duration;

use chililog_api::transport::{TlsMode, TransportConfig};
use url::Url;

/// Tokens are requested with an absolute lifetime of 14 days.
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Session expiry is polled every 5 minutes.
pub const DEFAULT_EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(300);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one Chililog server.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Server root URL (e.g., `http://localhost:8989`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Lifetime requested for new authentication tokens.
    pub token_expiry: Duration,
    /// How often the background watch checks for session expiry. The session
    /// is also considered expired this long before its actual expiry.
    pub expiry_check_interval: Duration,
}

impl ConsoleConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
            expiry_check_interval: DEFAULT_EXPIRY_CHECK_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
