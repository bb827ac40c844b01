//! Tracing setup for stowage.
//!
//! Console output, mirrored into a log file when one is configured. The
//! `RUST_LOG` environment variable extends the configured level through
//! the standard env-filter directives.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name onto a tracing level. Unknown names fall
/// back to INFO.
fn level_of(name: &str) -> Level {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level_of(level).into())
}

fn open_log_file(path: &str) -> Result<Arc<File>> {
    let dir = Path::new(path).parent();
    if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(Arc::new(File::create(path)?))
}

/// Install the global subscriber.
///
/// Writes to stdout and to the configured log file; an empty `file` keeps
/// output console-only. Fails if the log file cannot be created.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if config.file.is_empty() {
        init_console_only(&config.level);
        return Ok(());
    }

    let sink = open_log_file(&config.file)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(io::stdout.and(sink)),
        )
        .with(filter_for(&config.level))
        .init();

    Ok(())
}

/// Install a console-only subscriber, for development and tests.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(io::stdout),
        )
        .with(filter_for(level))
        .init();
}
