//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::ExposeSecret;

use chililog_config::{self as shared, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref expiry) = p.token_expiry {
            let _ = writeln!(out, "token_expiry = \"{expiry}\"");
        }
        if let Some(ref interval) = p.expiry_check_interval {
            let _ = writeln!(out, "expiry_check_interval = \"{interval}\"");
        }
    }

    out
}

/// Structured view of the config with plaintext passwords masked.
fn redacted_value(cfg: &Config) -> Result<serde_json::Value, CliError> {
    let mut value = serde_json::to_value(cfg)
        .map_err(|e| CliError::Internal(format!("config rendering failed: {e}")))?;
    if let Some(profiles) = value.get_mut("profiles").and_then(|p| p.as_object_mut()) {
        for profile in profiles.values_mut() {
            if let Some(pw) = profile.get_mut("password").filter(|pw| !pw.is_null()) {
                *pw = serde_json::Value::String("****".into());
            }
        }
    }
    Ok(value)
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &str,
) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

fn check_duration(key: &str, value: &str) -> Result<(), CliError> {
    let parsed = shared::parse_duration_value(key, value)?;
    if parsed.is_zero() {
        return Err(CliError::Validation {
            field: key.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = shared::config_path();
            let mut cfg = shared::load_config()?;
            eprintln!("Chililog console configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(global.profile.clone().unwrap_or_else(|| "default".into()))
                .interact_text()
                .map_err(prompt_err)?;

            if cfg.profiles.contains_key(&profile_name)
                && !Confirm::new()
                    .with_prompt(format!("Profile '{profile_name}' exists. Replace it?"))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?
            {
                return Ok(());
            }

            let server: String = Input::new()
                .with_prompt("Server URL")
                .default("http://localhost:8989".into())
                .interact_text()
                .map_err(prompt_err)?;
            if server.parse::<url::Url>().is_err() {
                return Err(CliError::Validation {
                    field: "server".into(),
                    reason: format!("invalid URL: {server}"),
                });
            }

            let username: String = Input::new()
                .with_prompt("Username (empty to log in interactively)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let mut password = None;
            if !username.is_empty() {
                let choices = &[
                    "Ask at login (recommended)",
                    "Store in system keyring",
                    "Save to config file (plaintext)",
                ];
                let selection = Select::new()
                    .with_prompt("Password")
                    .items(choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                match selection {
                    1 => {
                        let secret = util::prompt_password("Password: ")?;
                        shared::store_password(&profile_name, &secret)?;
                        eprintln!("   Password stored in system keyring");
                    }
                    2 => {
                        let secret = util::prompt_password("Password: ")?;
                        password = Some(secret.expose_secret().to_owned());
                    }
                    _ => {}
                }
            }

            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    server,
                    username: Some(username).filter(|u| !u.is_empty()),
                    password,
                    ..Profile::default()
                },
            );
            let default_exists = cfg
                .default_profile
                .as_ref()
                .is_some_and(|d| cfg.profiles.contains_key(d));
            if !default_exists {
                cfg.default_profile = Some(profile_name.clone());
            }
            shared::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Next: chililog login --profile {profile_name}");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = shared::load_config()?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => format_config_redacted(&cfg),
                _ => output::render_single(
                    &global.output,
                    &redacted_value(&cfg)?,
                    |_| String::new(),
                    |_| String::new(),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = shared::load_config()?;
            let profile_name = active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "server" => {
                    parse_value::<url::Url>(&key, &value, "a URL")?;
                    profile.server = value;
                }
                "username" => profile.username = Some(value),
                "password_env" | "password-env" => profile.password_env = Some(value),
                "insecure" => {
                    profile.insecure = Some(parse_value(&key, &value, "'true' or 'false'")?);
                }
                "timeout" => {
                    profile.timeout = Some(parse_value(&key, &value, "a number (seconds)")?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "token_expiry" | "token-expiry" => {
                    check_duration(&key, &value)?;
                    profile.token_expiry = Some(value);
                }
                "expiry_check_interval" | "expiry-check-interval" => {
                    check_duration(&key, &value)?;
                    profile.expiry_check_interval = Some(value);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, username, \
                             password_env, insecure, timeout, ca_cert, token_expiry, \
                             expiry_check_interval"
                        ),
                    });
                }
            }

            shared::save_config(&cfg)?;
            output::notice(global, &format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = shared::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: chililog config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = shared::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            shared::save_config(&cfg)?;
            output::notice(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = shared::load_config()?;
            let profile_name = active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }
            let secret = util::prompt_password("Password: ")?;
            shared::store_password(&profile_name, &secret)?;
            output::notice(
                global,
                &format!("Password stored in system keyring for profile '{profile_name}'"),
            );
            Ok(())
        }
    }
}
