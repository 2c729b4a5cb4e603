//! # Logging Utilities
//!
//! Logging infrastructure for the AFE tools using `tracing`.
//!
//! Console output always goes to **stderr**: stdout is reserved for the
//! rendered report so it can be piped or redirected untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use afe_utils::init_logging;
//!
//! // Keep the guard alive for the whole program so file logs get flushed
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::warn!("Something looks off");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=afe_core=trace`)
//! - `AFE_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `AFE_LOG_FILE`: Optional log file. A plain path is a prefix rolled daily
//!   into `<path>.YYYY-MM-DD`; an existing directory receives one
//!   `YYYY-MM-DD-afe.log` file per day.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, Utc};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "AFE_LOG_FORMAT";

/// Environment variable naming an optional log file
pub const LOG_FILE_ENV: &str = "AFE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel
{
    Error,
    /// Default: only resolver failures and other problems are shown
    #[default]
    Warn,
    Info,
    Debug,
    /// Every resolved address
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Keeps the background file writer alive
///
/// Dropping it flushes any buffered file output. Console-only logging holds
/// nothing.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _worker: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LoggingGuard
{
    /// File receiving log output when logging started, if any
    ///
    /// A daily-rolled file moves on to the next date after midnight UTC.
    pub fn log_file(&self) -> Option<&Path>
    {
        self.log_file.as_deref()
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (default `warn`)
/// - `AFE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `AFE_LOG_FILE`: Optional log file
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `AFE_LOG_FORMAT` holds an unknown format
/// - The log file directory cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = match std::env::var(LOG_FORMAT_ENV) {
        Ok(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
        Err(_) => LogFormat::default(),
    };
    init_logging_with_format(format)
}

/// Initialize logging with an explicit format, level still taken from `RUST_LOG`
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_format(format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    // RUST_LOG may hold a full directive list; only a bare level is used as the default here
    let default_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LogLevel>().ok())
        .unwrap_or_default();

    init_logging_internal(format, default_level.into(), false)
}

/// Initialize logging with explicit level and format
///
/// The explicit level wins over `RUST_LOG`. `AFE_LOG_FILE` is still honoured.
///
/// ## Example
///
/// ```rust,no_run
/// use afe_utils::{init_logging_with_level, LogFormat, LogLevel};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging_internal(format, level.into(), true)
}

fn init_logging_internal(format: LogFormat, level: Level, explicit: bool) -> Result<LoggingGuard, LoggingError>
{
    let env_filter = || {
        if explicit {
            EnvFilter::new(level.to_string())
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
        }
    };

    let console_layer: BoxedLayer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(env_filter())
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(env_filter())
            .boxed(),
    };

    let mut guard = LoggingGuard::default();
    let mut layers = vec![console_layer];
    if let Some(path) = std::env::var_os(LOG_FILE_ENV).map(PathBuf::from) {
        let (appender, resolved) = file_appender(&path)?;
        let (non_blocking, worker) = tracing_appender::non_blocking(appender);
        guard._worker = Some(worker);
        guard.log_file = Some(resolved);

        let layer: BoxedLayer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false) // No ANSI in files
                .with_filter(env_filter())
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter())
                .boxed(),
        };
        layers.push(layer);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(guard)
}

/// Appender for `path`, plus the file it writes to today
///
/// An existing directory gets a dated file written without rotation. Anything
/// else is a file name prefix: output rolls daily into `<name>.YYYY-MM-DD`
/// (UTC date) next to it.
fn file_appender(path: &Path) -> Result<(RollingFileAppender, PathBuf), LoggingError>
{
    let (dir, name, rotation, resolved) = if path.is_dir() {
        let name = dated_file_name(&Local::now().format("%Y-%m-%d").to_string());
        (path.to_path_buf(), name.clone(), Rotation::NEVER, path.join(name))
    } else {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(name) = path.file_name() else {
            return Err(LoggingError::InvalidFile(path.to_path_buf()));
        };
        std::fs::create_dir_all(&dir)?;
        let name = name.to_string_lossy().into_owned();
        // tracing-appender dates daily files in UTC
        let today = daily_file_name(&name, &Utc::now().format("%Y-%m-%d").to_string());
        let resolved = dir.join(today);
        (dir, name, Rotation::DAILY, resolved)
    };

    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name)
        .build(&dir)
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok((appender, resolved))
}

fn dated_file_name(date: &str) -> String
{
    format!("{date}-afe.log")
}

fn daily_file_name(prefix: &str, date: &str) -> String
{
    format!("{prefix}.{date}")
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// The log file path has no file name
    #[error("Invalid log file path: {}", .0.display())]
    InvalidFile(PathBuf),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
