//! Config subcommand handlers.

use dialoguer::{Input, Select};

use smartdash_config::{self as config, Config, SessionBackend};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const KEYS: &str = "api.base_url, api.timeout_secs, api.insecure, api.ca_cert, \
                    polling.auth_check_secs, polling.refresh_secs, session.backend, \
                    session.path, defaults.output, defaults.color";

// ── Helpers ─────────────────────────────────────────────────────────

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value
        .parse()
        .map_err(|_| invalid(field, "must be a number (seconds)"))
}

fn detail(c: &Config) -> String {
    let ca = c
        .api
        .ca_cert
        .as_ref()
        .map_or_else(|| "-".into(), |p| p.display().to_string());
    let session_path = c
        .session
        .path
        .clone()
        .unwrap_or_else(config::session_path);
    let backend = match c.session.backend {
        SessionBackend::File => format!("file ({})", session_path.display()),
        SessionBackend::Keyring => "keyring".into(),
    };
    [
        format!("Base URL:      {}", c.api.base_url),
        format!("Timeout:       {}s", c.api.timeout_secs),
        format!("Insecure TLS:  {}", c.api.insecure),
        format!("CA cert:       {ca}"),
        format!("Auth check:    every {}s", c.polling.auth_check_secs),
        format!("Refresh:       every {}s", c.polling.refresh_secs),
        format!("Session:       {backend}"),
        format!("Output:        {}", c.defaults.output),
        format!("Color:         {}", c.defaults.color),
    ]
    .join("\n")
}

/// Apply `key = value` to `cfg`.
fn set_key(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api.base_url" | "base_url" => cfg.api.base_url = value,
        "api.timeout_secs" | "timeout" => cfg.api.timeout_secs = parse_secs(key, &value)?,
        "api.insecure" | "insecure" => {
            cfg.api.insecure = value
                .parse()
                .map_err(|_| invalid(key, "must be 'true' or 'false'"))?;
        }
        "api.ca_cert" | "ca_cert" => {
            cfg.api.ca_cert = if value.is_empty() {
                None
            } else {
                Some(value.into())
            };
        }
        "polling.auth_check_secs" => cfg.polling.auth_check_secs = parse_secs(key, &value)?,
        "polling.refresh_secs" => cfg.polling.refresh_secs = parse_secs(key, &value)?,
        "session.backend" => {
            cfg.session.backend = match value.to_ascii_lowercase().as_str() {
                "file" => SessionBackend::File,
                "keyring" => SessionBackend::Keyring,
                _ => return Err(invalid(key, "must be 'file' or 'keyring'")),
            };
        }
        "session.path" => {
            cfg.session.path = if value.is_empty() {
                None
            } else {
                Some(value.into())
            };
        }
        "defaults.output" => {
            if !matches!(
                value.as_str(),
                "table" | "json" | "json-compact" | "yaml" | "plain"
            ) {
                return Err(invalid(key, "must be table, json, json-compact, yaml or plain"));
            }
            cfg.defaults.output = value;
        }
        "defaults.color" => {
            if !matches!(value.as_str(), "auto" | "always" | "never") {
                return Err(invalid(key, "must be auto, always or never"));
            }
            cfg.defaults.color = value;
        }
        other => {
            return Err(invalid(
                other,
                format!("unknown config key '{other}'. Valid keys: {KEYS}"),
            ));
        }
    }
    // Reject values the dashboard would refuse at startup.
    cfg.to_dashboard_config()?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("smartdash configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let base_url: String = Input::new()
                .with_prompt("Backend URL (including /api/v1)")
                .default(cfg.api.base_url.clone())
                .interact_text()
                .map_err(prompt_err)?;
            set_key(&mut cfg, "api.base_url", base_url)?;

            let refresh: u64 = Input::new()
                .with_prompt("Dashboard refresh period (seconds, 0 disables)")
                .default(cfg.polling.refresh_secs)
                .interact_text()
                .map_err(prompt_err)?;
            cfg.polling.refresh_secs = refresh;

            let backends = &["Session file (recommended)", "System keyring"];
            let selection = Select::new()
                .with_prompt("Where to keep the sign-in session?")
                .items(backends)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            cfg.session.backend = if selection == 0 {
                SessionBackend::File
            } else {
                SessionBackend::Keyring
            };

            let path = config::save_config(&cfg)?;
            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("\n  Next: smartdash auth login <email>");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, detail, |c| {
                c.api.base_url.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            set_key(&mut cfg, &key, value)?;
            let path = config::save_config(&cfg)?;
            output::notice(&format!("✓ Set {key} in {}", path.display()), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
