//! Tracing setup: console layer plus a daily file layer with bounded retention.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::constants::logging::{FILE_PREFIX, FILE_SUFFIX, MAX_FILES};

/// Everything from this crate at DEBUG, dependencies at INFO.
const FILE_DIRECTIVES: &str = "info,futures_order_cli=debug,futures_order=debug";

/// Installs the global subscriber. The returned guard flushes the file
/// writer on drop and must live until the process exits. `None` means file
/// logging is off and only the console layer is active.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directives(&config.level)));

    // stdout is reserved for reports and --json output.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match file_appender(&config.dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(FILE_DIRECTIVES));
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                config.dir.display(),
                e
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Daily `trading_bot.<date>.log` files under `dir`, keeping the newest
/// [`MAX_FILES`]. Creates `dir` when missing and fails instead of panicking
/// when it cannot.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(MAX_FILES)
        .build(dir)
}

/// Glob-style name of the log files in `dir`, for user-facing hints.
pub fn log_file_pattern(dir: &Path) -> String {
    dir.join(format!("{}.*.{}", FILE_PREFIX, FILE_SUFFIX))
        .display()
        .to_string()
}

/// Turns a bare level into a filter directive, falling back to `info` for
/// anything `EnvFilter` would not accept.
pub fn console_directives(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => level,
        _ if EnvFilter::try_new(&level).is_ok() && !level.is_empty() => level,
        _ => "info".to_string(),
    }
}
