//! Configuration for fritzhome hubs.
//!
//! TOML hub profiles, password resolution (env + keyring + plaintext),
//! and translation to `fritzhome_core::HubConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fritzhome_core::{DEFAULT_HOST, DEFAULT_UPDATE_INTERVAL, HubConfig};

/// Keyring service name under which hub passwords are stored.
pub const KEYRING_SERVICE: &str = "fritzhome";

/// Prefix of environment variables merged over the config file.
pub const ENV_PREFIX: &str = "FRITZHOME_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no hub named '{hub}' is configured")]
    UnknownHub { hub: String },

    #[error("no password configured for hub '{hub}'")]
    NoCredentials { hub: String },

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Hub used when none is named explicitly.
    pub default_hub: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub hubs: HashMap<String, HubProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_hub: Some("default".into()),
            defaults: Defaults::default(),
            hubs: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the hub to use: the explicit one, else `default_hub`,
    /// else `"default"`.
    pub fn active_hub_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_hub.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Resolve a named hub into a runtime [`HubConfig`].
    pub fn hub_config(&self, hub: &str) -> Result<HubConfig, ConfigError> {
        let profile = self.hubs.get(hub).ok_or_else(|| ConfigError::UnknownHub {
            hub: hub.into(),
        })?;
        profile_to_hub_config(profile, hub, &self.defaults)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Seconds between two polls.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            update_interval: default_update_interval(),
        }
    }
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL.as_secs()
}

/// A named hub profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubProfile {
    /// Hostname or URL (e.g. "fritz.box", "https://192.168.178.1").
    #[serde(default = "default_host")]
    pub host: String,

    /// SmartHome user.
    pub username: Option<String>,

    /// Plaintext password. Keyring or `password_env` take precedence.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override the poll interval (seconds).
    pub update_interval: Option<u64>,
}

impl Default for HubProfile {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: None,
            password: None,
            password_env: None,
            update_interval: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fritzhome", "fritzhome").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fritzhome");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a hub password: `password_env` → keyring → plaintext.
pub fn resolve_password(profile: &HubProfile, hub: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{hub}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { hub: hub.into() })
}

/// Build a `HubConfig` from a profile.
pub fn profile_to_hub_config(
    profile: &HubProfile,
    hub: &str,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let update_interval = profile.update_interval.unwrap_or(defaults.update_interval);
    if update_interval == 0 {
        return Err(ConfigError::Validation {
            field: "update_interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    let username = profile.username.clone().unwrap_or_default();
    let password = resolve_password(profile, hub)?;

    let mut config = HubConfig::new(hub, host, username, password);
    config.update_interval = Duration::from_secs(update_interval);

    config
        .configuration_url()
        .map_err(|e| ConfigError::Validation {
            field: "host".into(),
            reason: format!("invalid host '{host}': {e}"),
        })?;

    Ok(config)
}
