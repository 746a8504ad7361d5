//! Logging bootstrap
//!
//! The library only talks to the `log` facade. The binary picks a backend:
//! stderr for CLI commands, an append-only file for the TUI (stderr shares
//! the terminal there). `RUST_LOG` always wins over the configured level.

use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

const SUPPORTED_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Validate and lowercase a configured level name
pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    let wanted = level.trim().to_ascii_lowercase();
    SUPPORTED_LEVELS
        .iter()
        .copied()
        .find(|l| *l == wanted)
        .ok_or_else(|| {
            format!(
                "unsupported log level `{}` (expected one of {})",
                level,
                SUPPORTED_LEVELS.join(", ")
            )
        })
}

fn builder(level: &str) -> Builder {
    let level = normalize_level(level).unwrap_or("warn");
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp(None).format_target(false);
    builder
}

/// Log to stderr. Safe to call more than once; later calls are ignored.
pub fn init_stderr(level: &str) {
    let _ = builder(level).try_init();
}

/// Log to a file, appending. Used while the terminal is in raw mode.
pub fn init_file(level: &str, path: &Path) -> Result<(), String> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("failed to open log file `{}`: {}", path.display(), e))?;

    let mut builder = builder(level);
    builder
        .format_timestamp_secs()
        .target(Target::Pipe(Box::new(file)));
    builder
        .try_init()
        .map_err(|e| format!("logger already initialized: {}", e))
}
