//! File-backed tracing setup. The terminal belongs to the UI, so logs never
//! go to stdout or stderr.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "KGRAPH_LOG";

/// `<data_dir>/kgraph/kgraph.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("kgraph").join("kgraph.log"))
}

/// `KGRAPH_LOG` wins over the configured level.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing to `path`.
///
/// The returned guard flushes buffered lines on drop and must be held for
/// the life of the program.
pub fn init(level: &str, path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back() {
        // Only meaningful when KGRAPH_LOG is unset, which is the case under cargo test.
        if std::env::var_os(LOG_ENV).is_none() {
            assert_eq!(filter("kgraph=notalevel").to_string(), "info");
            assert_eq!(filter("debug").to_string(), "debug");
        }
    }

    #[test]
    fn default_path_ends_with_log_file() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("kgraph/kgraph.log"));
        }
    }
}
