//! Configuration for the smartdash binaries.
//!
//! TOML file + `SMARTDASH_` environment overrides, translation to
//! `smartdash_core::DashboardConfig`, and selection of the durable
//! session backend (JSON file or OS keyring).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use smartdash_core::config::DEFAULT_BASE_URL;
use smartdash_core::{DashboardConfig, FileSessionStore, SessionKey, SessionStore, TlsMode};

const APP_NAME: &str = "smartdash";
const KEYRING_SERVICE: &str = "smartdash";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub defaults: Defaults,
}

/// Backend location and transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    /// Base URL including the `/api/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

/// Background poll periods, in seconds. Zero disables a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default = "default_poll")]
    pub auth_check_secs: u64,

    #[serde(default = "default_poll")]
    pub refresh_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            auth_check_secs: default_poll(),
            refresh_secs: default_poll(),
        }
    }
}

/// Where the durable session (token + user id) lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSection {
    #[serde(default)]
    pub backend: SessionBackend,

    /// Session file override for the `file` backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll() -> u64 {
    300
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "smart-solutions", APP_NAME)
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the file-backed session.
pub fn session_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push(APP_NAME);
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, then apply `SMARTDASH_` env overrides
/// (`SMARTDASH_API__BASE_URL`, `SMARTDASH_POLLING__REFRESH_SECS`, ...).
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SMARTDASH_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load config, falling back to the defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|err| {
        warn!(error = %err, "using default configuration");
        Config::default()
    })
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build the runtime dashboard configuration.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let url: url::Url = self
            .api
            .base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "api.base_url".into(),
                reason: format!("invalid URL: {}", self.api.base_url),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api.base_url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let tls = if self.api.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.api.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        Ok(DashboardConfig {
            base_url: self.api.base_url.clone(),
            tls,
            timeout: Duration::from_secs(self.api.timeout_secs),
            auth_check_interval: Duration::from_secs(self.polling.auth_check_secs),
            refresh_interval: Duration::from_secs(self.polling.refresh_secs),
        })
    }

    /// Open the configured session backend.
    pub fn open_session_store(&self) -> Arc<dyn SessionStore> {
        match self.session.backend {
            SessionBackend::File => {
                let path = self.session.path.clone().unwrap_or_else(session_path);
                Arc::new(FileSessionStore::new(path))
            }
            SessionBackend::Keyring => Arc::new(KeyringSessionStore::new()),
        }
    }
}

// ── Keyring session backend ─────────────────────────────────────────

/// Session kept in the OS keyring, one entry per key.
///
/// Keyring failures are logged and read as an absent value.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: SessionKey) -> Option<keyring::Entry> {
        keyring::Entry::new(&self.service, key.as_str())
            .inspect_err(|err| warn!(%key, error = %err, "keyring unavailable"))
            .ok()
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        match self.entry(key)?.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(err) => {
                warn!(%key, error = %err, "keyring read failed");
                None
            }
        }
    }

    fn set(&self, key: SessionKey, value: &str) {
        if let Some(entry) = self.entry(key) {
            if let Err(err) = entry.set_password(value) {
                warn!(%key, error = %err, "keyring write failed");
            }
        }
    }

    fn remove(&self, key: SessionKey) {
        if let Some(entry) = self.entry(key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(err) => warn!(%key, error = %err, "keyring delete failed"),
            }
        }
    }
}
