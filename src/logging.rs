use anyhow::{Context, Result};
use directories::ProjectDirs;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "markcal";

/// Starts file logging. The terminal belongs to the TUI, so nothing is
/// written to stdout or stderr. Keep the handle alive until exit.
pub fn init_logging(log_file: Option<&Path>) -> Result<LoggerHandle> {
    let spec = match log_file {
        Some(path) => FileSpec::try_from(path).context("invalid log file path")?,
        None => {
            let dir = default_log_dir();
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;
            FileSpec::default()
                .directory(dir)
                .basename(LOG_FILE_BASENAME)
        }
    };
    let handle = Logger::try_with_env_or_str(default_log_level())
        .context("invalid log level")?
        .log_to_file(spec)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;
    log::info!(
        "event=app_start version={} build_mode={}",
        env!("CARGO_PKG_VERSION"),
        default_log_level()
    );
    Ok(handle)
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "markcal")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("markcal-logs"))
}
