//! Optional TOML configuration. Every key has a default, so a missing file
//! or a partial one is fine.
//!
//! ```toml
//! source = "~/Documents/Bhajans.sqlite"
//! table = "bhajans"
//!
//! [logging]
//! level = "debug"
//! file = "bhajan-browser.log"
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::DEFAULT_TABLE;

/// Folder beneath the user's home directory holding configuration and logs.
pub const APP_DIR_NAME: &str = ".bhajan-browser";
const CONFIG_FILE_NAME: &str = "config.toml";
/// Source table looked up in the working directory when none is configured.
const DEFAULT_SOURCE: &str = "Bhajans.sqlite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the source table (SQLite) or an exported JSON collection.
    pub source: String,
    /// Table to read inside an SQLite source.
    pub table: String,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Log file, relative paths resolve inside the application directory.
    pub file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            table: DEFAULT_TABLE.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "bhajan-browser.log".to_string(),
        }
    }
}

impl Config {
    /// Load from `explicit` when given, otherwise from the default location.
    /// Only the default location may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = default_config_path()?;
                match Self::load_from_path(&path) {
                    Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                        Ok(Self::default())
                    }
                    other => other,
                }
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn source_path(&self, home: Option<&Path>) -> PathBuf {
        expand_home(&self.source, home)
    }

    pub fn log_path(&self, app_dir: &Path) -> PathBuf {
        let file = expand_home(&self.logging.file, app_dir.parent());
        if file.is_absolute() {
            file
        } else {
            app_dir.join(file)
        }
    }
}

/// Directory holding configuration and logs.
pub fn app_dir() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(base_dirs.home_dir().join(APP_DIR_NAME))
}

pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~` against `home`. Paths are returned unchanged when
/// there is no home directory.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}
