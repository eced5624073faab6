//! Layered configuration. Precedence: CLI > env > config file > defaults.

use crate::store::StoreOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATA_FILE: &str = "data/parcheggi.geojson";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const CONFIG_FILE_NAME: &str = "findspot.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("cannot parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// GeoJSON document holding the collection.
    pub data_file: PathBuf,
    /// Address the HTTP server listens on.
    pub bind: String,
    pub lock_timeout_ms: u64,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            bind: DEFAULT_BIND.to_string(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            log_dir: None,
            log_level: None,
            log_retention: None,
        }
    }
}

impl AppConfig {
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML.
    pub fn from_toml_str(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|source| ConfigError::Parse { path: origin.to_path_buf(), source })
    }

    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&s, path)
    }

    /// Override fields from `FINDSPOT_*` variables, looked up through `var`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for values that do not parse.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(s) = var("FINDSPOT_DATA") {
            self.data_file = PathBuf::from(s);
        }
        if let Some(s) = var("FINDSPOT_BIND") {
            self.bind = s;
        }
        if let Some(s) = var("FINDSPOT_LOCK_TIMEOUT_MS") {
            self.lock_timeout_ms = s.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FINDSPOT_LOCK_TIMEOUT_MS".into(),
                value: s.clone(),
            })?;
        }
        if let Some(s) = var("FINDSPOT_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = var("FINDSPOT_LOG_LEVEL") {
            self.log_level = Some(s);
        }
        if let Some(s) = var("FINDSPOT_LOG_RETENTION") {
            let n = s.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FINDSPOT_LOG_RETENTION".into(),
                value: s.clone(),
            })?;
            self.log_retention = Some(n);
        }
        Ok(())
    }

    #[must_use]
    pub const fn store_options(&self) -> StoreOptions {
        StoreOptions { lock_timeout: Duration::from_millis(self.lock_timeout_ms) }
    }
}

/// Config file to read: the explicit path if given, else `$FINDSPOT_CONFIG`,
/// else `./findspot.toml` when it exists.
fn locate(cli_config: Option<&Path>, var: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(p) = cli_config {
        return Some(p.to_path_buf());
    }
    if let Some(p) = var("FINDSPOT_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let local = std::env::current_dir().ok()?.join(CONFIG_FILE_NAME);
    local.exists().then_some(local)
}

/// Resolve file and environment layers with an injectable variable lookup.
///
/// # Errors
/// Returns an error if a named config file is unreadable or invalid, or an
/// environment value does not parse.
pub fn load_with(
    cli_config: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut cfg = match locate(cli_config, &var) {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::default(),
    };
    cfg.apply_env(var)?;
    Ok(cfg)
}

/// [`load_with`] using the process environment.
///
/// # Errors
/// See [`load_with`].
pub fn load(cli_config: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with(cli_config, |k| std::env::var(k).ok())
}
