//! File logging. A TUI owns the terminal, so events go to a log file in the cache directory.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Environment variable holding a log filter
pub const LOG_ENV: &str = "PMFVIZ_LOG";

/// Pick the active filter. The command line wins over the environment, which wins over config.
/// Returns None when logging stays off.
pub fn resolve_filter(
    cli: Option<&str>,
    env: Option<&str>,
    config: &LoggingConfig,
) -> Option<String> {
    let non_empty = |s: &&str| !s.trim().is_empty();
    if let Some(filter) = cli.filter(non_empty) {
        return Some(filter.to_string());
    }
    if let Some(filter) = env.filter(non_empty) {
        return Some(filter.to_string());
    }
    if config.enabled {
        return Some(config.level.clone());
    }
    None
}

/// Install the global subscriber writing to `dir/file_name`. Returns the log path.
pub fn init(filter: &str, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| eyre!("Invalid log filter '{}': {}", filter, e))?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| eyre!("Could not install logger: {}", e))?;

    Ok(path)
}
