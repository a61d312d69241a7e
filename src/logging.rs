//! `tracing` subscriber setup for the `bfit` binary.

use std::fs::File;
use std::path::PathBuf;

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crate::error::AppError;

/// Map `-v` count and `-q` onto a level filter.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber: compact stderr output plus an optional
/// plain-text log file.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<(), AppError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    let installed = if let Some(path) = log_file {
        let file = File::create(&path).map_err(|e| {
            AppError::new(2, format!("Failed to create log file '{}': {e}", path.display()))
        })?;
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);
        subscriber.with(file_layer).try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| AppError::new(2, format!("Failed to install logger: {e}")))
}
