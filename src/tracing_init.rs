//! Shared tracing initialization.
//!
//! Long-running commands append structured logs to
//! `{data_dir}/group-digest.log`; interactive commands may log to stderr.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "group-digest.log";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize tracing to `{data_dir}/group-digest.log` (append mode).
pub fn init_file_tracing(data_dir: &Path) {
    std::fs::create_dir_all(data_dir).ok();
    let log_path = data_dir.join(LOG_FILE);

    // Open in APPEND mode — several CLI processes may write to the same file.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .unwrap_or_else(|_| {
            let null = if cfg!(windows) { "NUL" } else { "/dev/null" };
            std::fs::File::create(null).expect("Cannot create log fallback")
        });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .init();
}

/// Initialize tracing to stderr (`--verbose`).
pub fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("debug"))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
