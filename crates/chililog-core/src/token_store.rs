// ── Persisted authentication tokens ──
//
// "Remember me" storage for the session token, and decoding of the claims
// embedded in it. A token is `<json>~~~<signature>`; the JSON part carries
// the absolute expiry as `ExpiresOn`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::CoreError;

const CLAIMS_DELIMITER: &str = "~~~";

/// Where a remembered token lives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SecretString>, CoreError>;
    fn save(&self, token: &SecretString) -> Result<(), CoreError>;
    /// Remove any stored token. Succeeds when nothing was stored.
    fn clear(&self) -> Result<(), CoreError>;
}

// ── In-memory store ──────────────────────────────────────────────────

/// Process-lifetime token storage.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: ArcSwapOption<SecretString>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.token.load_full().map(|t| (*t).clone()))
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.token.store(Some(std::sync::Arc::new(token.clone())));
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.token.store(None);
        Ok(())
    }
}

// ── File store ───────────────────────────────────────────────────────

/// Token kept in a single file, readable only by the owner on unix.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &str, err: &io::Error) -> CoreError {
        CoreError::Config {
            message: format!("cannot {action} token file {}: {err}", self.path.display()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_owned())))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("read", &e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", &e))?;
        }
        fs::write(&self.path, token.expose_secret()).map_err(|e| self.io_error("write", &e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error("protect", &e))?;
        }

        debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", &e)),
        }
    }
}

// ── Token claims ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawClaims {
    #[serde(rename = "ExpiresOn")]
    expires_on: Option<String>,
}

/// Claims readable from a token without contacting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub expires_on: DateTime<Utc>,
}

impl TokenClaims {
    /// Decode the claims part of `token`. `None` when the token is malformed
    /// or carries no expiry.
    pub fn parse(token: &SecretString) -> Option<Self> {
        let raw = token.expose_secret();
        let (json, _signature) = raw.split_once(CLAIMS_DELIMITER)?;
        let claims: RawClaims = serde_json::from_str(json).ok()?;
        let expires_on = parse_timestamp(claims.expires_on.as_deref()?)?;
        Some(Self { expires_on })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_on
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
