//! Logging init: file under the user's local data dir, or stderr as fallback.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::APP_DIR;

const DEFAULT_FILTER: &str = "info,yt_mp3_downloader=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to `<local data dir>/yt-mp3-downloader/yt-mp3-downloader.log`.
/// Returns Err when the file cannot be opened so the caller can use stderr.
pub fn init_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .context("no local data directory")?
        .join(APP_DIR);
    fs::create_dir_all(&log_dir)?;
    let log_file_path = log_dir.join(format!("{APP_DIR}.log"));

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open {}", log_file_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("logging to {}", log_file_path.display());
    Ok(())
}

/// Stderr-only logging, used when `init_logging` fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .try_init();
}
