//! Structured logging setup for hosts embedding the adapter.
//!
//! Provides:
//! - Daily rotating log files
//! - Build-type conditional log levels
//! - Console-only fallback when file logging fails
//! - Environment variable override via EXASOL_ADAPTER_LOG or RUST_LOG
//!
//! The adapter itself only emits `tracing` events; calling [`init_logging`]
//! is optional and meant for hosts without their own subscriber.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an adapter-specific filter.
pub const LOG_ENV_VAR: &str = "EXASOL_ADAPTER_LOG";

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether running in a PTY (stdout-only output)
    pub is_pty: bool,
    /// Optional custom log filter
    pub log_filter: Option<String>,
}

impl LogConfig {
    /// Create a new logging configuration.
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir, is_pty: atty::is(atty::Stream::Stdout), log_filter: None }
    }

    /// Set custom log filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Guard that must be held for the lifetime of the host.
///
/// Dropping this guard flushes pending log entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// If file logging initialization fails, falls back to console-only.
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    if config.is_pty {
        return init_stdout_logging(config.log_filter.as_deref());
    }

    match file_writer(&config.log_dir) {
        Ok((writer, guard)) => {
            let combined = std::io::stdout.with_max_level(tracing::Level::INFO).and(writer);
            let installed = tracing_subscriber::fmt()
                .with_writer(combined)
                .with_env_filter(build_env_filter(config.log_filter.as_deref()))
                .with_ansi(false)
                .with_target(true)
                .try_init();
            if installed.is_err() {
                // Host already installed a subscriber; its output wins.
                tracing::debug!("Global subscriber already set; file logging not installed");
                return LoggingGuard { _worker_guard: None };
            }
            LoggingGuard { _worker_guard: Some(guard) }
        }
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {}. Using console only.", e);
            init_stdout_logging(config.log_filter.as_deref())
        }
    }
}

/// Initialize with defaults (convenience function).
pub fn init_logging_default() -> LoggingGuard {
    init_logging(LogConfig::new(log_dir()))
}

/// Initialize stdout-only logging.
fn init_stdout_logging(filter: Option<&str>) -> LoggingGuard {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(filter))
        .with_ansi(true)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
    if installed.is_err() {
        // Host already installed a subscriber; its output wins.
        tracing::debug!("Global subscriber already set; stdout logging not installed");
    }

    LoggingGuard { _worker_guard: None }
}

/// Create the log directory and a non-blocking daily rotating writer in it.
fn file_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("exasol-adapter")
        .filename_suffix("log")
        .build(log_dir)?;

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Build the environment filter from config or defaults.
fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    // Priority: custom filter > EXASOL_ADAPTER_LOG > RUST_LOG > default
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    }

    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Get the default log filter based on build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "info,exasol_adapter=trace"
    }
    #[cfg(not(debug_assertions))]
    {
        "warn,exasol_adapter=info"
    }
}

/// Get the default log directory.
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("exasol-adapter")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_writer_creates_log_dir() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let (_writer, _guard) = file_writer(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_custom_filter_parses() {
        let filter = build_env_filter(Some("exasol_adapter=debug"));
        assert_eq!(filter.to_string(), "exasol_adapter=debug");
    }

    #[test]
    fn test_invalid_custom_filter_falls_back_to_default() {
        let filter = build_env_filter(Some("exasol_adapter=[bogus"));
        assert_eq!(filter.to_string(), EnvFilter::new(default_log_filter()).to_string());
    }

    #[test]
    fn test_log_dir_is_adapter_specific() {
        assert!(log_dir().ends_with("exasol-adapter/logs"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let _first = init_stdout_logging(Some("exasol_adapter=debug"));
        let second = init_stdout_logging(Some("exasol_adapter=debug"));
        assert!(second._worker_guard.is_none());

        let dir = tempdir().unwrap();
        let config = LogConfig { log_dir: dir.path().join("logs"), is_pty: false, log_filter: None };
        let file_guard = init_logging(config);
        assert!(file_guard._worker_guard.is_none());
    }

    #[test]
    fn test_log_config_with_filter() {
        let config = LogConfig::new(PathBuf::from("/tmp/logs")).with_filter("debug");
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }
}
