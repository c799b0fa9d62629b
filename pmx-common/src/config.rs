//! Client configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: it is logged and the
//! remaining sources are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const BACKEND_URL_ENV: &str = "PMX_BACKEND_URL";
pub const AUTH_TOKEN_ENV: &str = "PMX_AUTH_TOKEN";
pub const CONFIG_FILE_ENV: &str = "PMX_CONFIG";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TASK_POLL_INTERVAL_MS: u64 = 3000;

/// Settings needed to talk to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without trailing slash
    pub backend_url: String,
    /// Bearer token sent with every request, if any
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Delay between polls while waiting for a background task
    pub task_poll_interval_ms: u64,
    /// Give up waiting for a task after this long (`None` waits forever)
    pub task_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            auth_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            task_poll_interval_ms: DEFAULT_TASK_POLL_INTERVAL_MS,
            task_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms)
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }

    /// Check the settings make sense before any request is sent
    pub fn validate(&self) -> Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Backend URL must start with http:// or https://: {}",
                self.backend_url
            )));
        }
        if self.task_poll_interval_ms == 0 {
            return Err(Error::Config("Task poll interval must be positive".to_string()));
        }
        Ok(())
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub backend_url: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub task_poll_interval_ms: Option<u64>,
    pub task_timeout_secs: Option<u64>,
}

impl TomlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub auth_token: Option<String>,
    pub config_file: Option<PathBuf>,
    pub task_timeout_secs: Option<u64>,
}

/// Resolves a [`ClientConfig`] from all configuration sources
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    overrides: ConfigOverrides,
}

impl ConfigResolver {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }

    /// Config file to read: CLI path, then `PMX_CONFIG`, then platform locations
    pub fn config_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.overrides.config_file {
            return Some(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            return Some(PathBuf::from(path));
        }
        default_config_file()
    }

    fn load_toml(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            debug!("No config file found, using defaults");
            return TomlConfig::default();
        };
        match TomlConfig::load(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config file");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                TomlConfig::default()
            }
        }
    }

    pub fn resolve(&self) -> ClientConfig {
        let toml = self.load_toml();
        let defaults = ClientConfig::default();

        let backend_url = self
            .overrides
            .backend_url
            .clone()
            .or_else(|| std::env::var(BACKEND_URL_ENV).ok())
            .or(toml.backend_url)
            .unwrap_or(defaults.backend_url);

        let auth_token = self
            .overrides
            .auth_token
            .clone()
            .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok())
            .or(toml.auth_token)
            .filter(|t| !t.trim().is_empty());

        ClientConfig {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            auth_token,
            request_timeout_secs: toml
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            task_poll_interval_ms: toml
                .task_poll_interval_ms
                .unwrap_or(defaults.task_poll_interval_ms),
            task_timeout_secs: self.overrides.task_timeout_secs.or(toml.task_timeout_secs),
        }
    }
}

/// Platform config file location, if one exists
///
/// Tries the user config directory (`~/.config/pmx/config.toml` on Linux)
/// first, then `/etc/pmx/config.toml` on Unix.
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pmx").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/pmx/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
