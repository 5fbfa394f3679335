#![deny(missing_docs)]
//! Shared logging utilities for the mediakit workspace.
//!
//! This crate provides the `engine_*` and `job_*` logging macros used across
//! the codebase, the `simplelog` initialiser used by the binary and a minimal
//! test initializer for the global logger.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "mediakit.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Logs a debug-level message tagged with a job id (`[job N] ...`).
#[macro_export]
macro_rules! job_debug {
    ($job_id:expr, $($arg:tt)*) => {{
        $crate::log::debug!("[job {}] {}", $job_id, format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with a job id (`[job N] ...`).
#[macro_export]
macro_rules! job_info {
    ($job_id:expr, $($arg:tt)*) => {{
        $crate::log::info!("[job {}] {}", $job_id, format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with a job id (`[job N] ...`).
#[macro_export]
macro_rules! job_warn {
    ($job_id:expr, $($arg:tt)*) => {{
        $crate::log::warn!("[job {}] {}", $job_id, format_args!($($arg)*));
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to a log file only.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDestination::File => write!(f, "file"),
            LogDestination::Terminal => write!(f, "terminal"),
            LogDestination::Both => write!(f, "both"),
        }
    }
}

/// Error returned when a log destination name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log destination '{0}'")]
pub struct UnknownDestination(pub String);

impl FromStr for LogDestination {
    type Err = UnknownDestination;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogDestination::File),
            "terminal" | "term" => Ok(LogDestination::Terminal),
            "both" => Ok(LogDestination::Both),
            other => Err(UnknownDestination(other.to_string())),
        }
    }
}

/// Initialize the global logger.
///
/// `log_path` is only used for `File` and `Both`; it defaults to
/// [`DEFAULT_LOG_FILE`]. If the file cannot be created the file sink is
/// skipped with a warning on stderr. Calling this twice is a no-op.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: Option<&Path>) {
    let config = build_config();
    let path = log_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        if let Some(file_logger) = create_file_logger(level, config, &path) {
            loggers.push(file_logger);
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_parses_case_insensitively() {
        assert_eq!("Both".parse::<LogDestination>(), Ok(LogDestination::Both));
        assert_eq!(" file ".parse::<LogDestination>(), Ok(LogDestination::File));
        assert_eq!("term".parse::<LogDestination>(), Ok(LogDestination::Terminal));
        assert!("syslog".parse::<LogDestination>().is_err());
    }

    #[test]
    fn unknown_destination_names_the_rejected_value() {
        let err = "SysLog".parse::<LogDestination>().unwrap_err();
        assert_eq!(err, UnknownDestination("syslog".to_string()));
        assert_eq!(err.to_string(), "unknown log destination 'syslog'");
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn destination_round_trips_through_display() {
        for dest in [LogDestination::File, LogDestination::Terminal, LogDestination::Both] {
            assert_eq!(dest.to_string().parse::<LogDestination>(), Ok(dest));
        }
    }

    #[test]
    fn file_logger_is_skipped_for_unwritable_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("no_such_dir").join("x.log");
        assert!(create_file_logger(LevelFilter::Info, build_config(), &missing).is_none());

        let ok = temp.path().join("x.log");
        assert!(create_file_logger(LevelFilter::Info, build_config(), &ok).is_some());
        assert!(ok.exists());
    }
}
