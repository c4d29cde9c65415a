//! Profile resolution: config file + global flags into a `ConsoleConfig`.
//!
//! This is the single place where CLI config types cross into core types.

use std::time::Duration;

use chililog_config::{self as config, Config, Profile};
use chililog_core::{ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Where to connect, and as whom.
#[derive(Debug)]
pub struct Target {
    pub profile_name: String,
    pub console: ConsoleConfig,
    /// The profile entry, when one exists in the config file.
    pub profile: Option<Profile>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the connection target. Flags override the profile; without a
/// profile, `--server` alone is enough.
pub fn resolve_target(global: &GlobalOpts, mut cfg: Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, &cfg);
    let profile = cfg.profiles.remove(&profile_name);

    let mut console = match (&profile, global.server.as_deref()) {
        (Some(p), _) => config::profile_to_console_config(p, &cfg.defaults)?,
        (None, Some(server)) => ConsoleConfig::new(parse_server(server)?),
        (None, None) if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available.join(", "),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config::config_path().display().to_string(),
            });
        }
    };

    if let (Some(_), Some(server)) = (&profile, global.server.as_deref()) {
        console.url = parse_server(server)?;
    }
    if global.insecure {
        console.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        console.timeout = Duration::from_secs(secs);
    } else if profile.is_none() {
        console.timeout = Duration::from_secs(cfg.defaults.timeout);
    }

    Ok(Target {
        profile_name,
        console,
        profile,
    })
}

fn parse_server(server: &str) -> Result<url::Url, CliError> {
    server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })
}
