//! Log output goes to a file, the terminal belongs to the interface.
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

const FALLBACK_LEVEL: &str = "info";

/// Filter for `level`, or `info` when it does not parse.
pub fn configured_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber, appending to `log_path`.
pub fn init(level: &str, log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_level_is_kept() {
        assert_eq!(configured_filter("debug").to_string(), "debug");
        assert_eq!(
            configured_filter("bhajan_browser=trace").to_string(),
            "bhajan_browser=trace"
        );
    }

    #[test]
    fn invalid_level_falls_back_to_info() {
        assert_eq!(configured_filter("loud=very").to_string(), FALLBACK_LEVEL);
    }
}
