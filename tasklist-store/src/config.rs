//! Store settings, taken from flags, environment and an optional TOML file.
//!
//! A value given on the command line (or through its environment variable)
//! wins over `[server]` in the file, which wins over the compiled default.
//! Without `--config` the file is looked up at
//! `~/.config/tasklist-store/config.toml` and may be absent.

use std::path::{Path, PathBuf};

use crate::server::{DEFAULT_BASE_PATH, normalize_base_path};

/// Address the store listens on when nothing else is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5001";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// On-disk layout. Every key is optional.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FileSettings {
    server: FileServer,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FileServer {
    bind_addr: Option<String>,
    base_path: Option<String>,
}

/// Command line of the `tasklist-store` binary.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "In-memory task store")]
pub struct StoreCliArgs {
    /// Listen address, e.g. `0.0.0.0:8080`.
    #[arg(short, long, env = "TASKLIST_STORE_ADDR")]
    pub bind: Option<String>,

    /// Prefix the task collection is served under.
    #[arg(long, env = "TASKLIST_STORE_BASE_PATH")]
    pub base_path: Option<String>,

    /// Settings file to read instead of the default location.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tracing filter directive.
    #[arg(long, default_value = "info", env = "TASKLIST_STORE_LOG")]
    pub log_level: String,
}

/// Settings the store runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub bind_addr: String,
    /// Normalized: leading slash, no trailing slash.
    pub base_path: String,
    pub log_level: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads the settings file and layers `cli` over it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] if `--config` names a file that
    /// cannot be read (or the default file exists but cannot be read), and
    /// [`ConfigError::ParseToml`] if the file is not valid TOML.
    pub fn load(cli: &StoreCliArgs) -> Result<Self, ConfigError> {
        let settings = match read_settings(cli.config.as_deref())? {
            Some(text) => toml::from_str(&text)?,
            None => FileSettings::default(),
        };
        Ok(Self::layer(cli, settings))
    }

    fn layer(cli: &StoreCliArgs, file: FileSettings) -> Self {
        let base_path = cli
            .base_path
            .clone()
            .or(file.server.base_path)
            .map_or_else(|| DEFAULT_BASE_PATH.to_string(), |p| normalize_base_path(&p));
        Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.server.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            base_path,
            log_level: cli.log_level.clone(),
        }
    }
}

/// Text of the settings file, or `None` when the default file is absent.
fn read_settings(explicit: Option<&Path>) -> Result<Option<String>, ConfigError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match dirs::config_dir() {
            Some(dir) => (dir.join("tasklist-store").join("config.toml"), false),
            None => return Ok(None),
        },
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}
