use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{Result, SiftError};

/// Keeps the file writers alive; dropping it flushes buffered log lines
pub struct LogGuard {
    log_dir: PathBuf,
    _guards: Vec<WorkerGuard>,
}

impl LogGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Setup logging to the console and to an informational and a verbose file,
/// both rotated daily
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<LogGuard> {
    let log_dir = PathBuf::from(&config.dir);
    std::fs::create_dir_all(&log_dir)?;

    let (info_writer, info_guard) = non_blocking(rolling::daily(&log_dir, &config.info_file));
    let (debug_writer, debug_guard) = non_blocking(rolling::daily(&log_dir, &config.debug_file));

    let console_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::from_default_env().add_directive(console_level.into()));

    let info_layer = fmt::layer()
        .with_writer(info_writer)
        .with_target(false)
        .with_ansi(false) // No ANSI colors in file
        .with_filter(LevelFilter::INFO);

    let debug_layer = fmt::layer()
        .with_writer(debug_writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(info_layer)
        .with(debug_layer)
        .try_init()
        .map_err(|e| SiftError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!(
        "Logging initialized - console: {}, files: {}, {}",
        console_level,
        log_dir.join(&config.info_file).display(),
        log_dir.join(&config.debug_file).display()
    );

    Ok(LogGuard {
        log_dir,
        _guards: vec![info_guard, debug_guard],
    })
}
