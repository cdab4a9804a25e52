//! Pluggable logging for Prism
//!
//! Every message carries a source such as `"prism::Context"`. The global
//! [`Prism`](crate::prism::Prism) holder forwards entries to one [`Logger`];
//! [`DefaultLogger`] prints them to the terminal. ERROR entries also carry
//! the file and line that raised them.

use chrono::{DateTime, Local};
use colored::*;
use std::fmt;
use std::time::SystemTime;

/// Logger trait for custom logging implementations
///
/// Implement this trait to route Prism's messages elsewhere (file, test capture, ...)
///
/// # Example
///
/// ```no_run
/// use prism_gpu::prism::log::{Logger, LogEntry};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{} {}", entry.source, entry.message);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "prism::Context", "prism::vulkan::DescriptorPool")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Very verbose tracing (pool allocations, callback invocations)
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warning messages (potential issues)
    Warn,

    /// Error messages (with file:line details)
    Error,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO",
            LogSeverity::Warn => "WARN",
            LogSeverity::Error => "ERROR",
        };
        f.pad(name)
    }
}

/// Terminal logger used until another one is installed
///
/// Lines look like `12:04:31.207 WARN  prism::Context message`; ERROR lines
/// end with ` at file:line`. WARN and ERROR go to stderr, the rest to stdout.
pub struct DefaultLogger;

impl DefaultLogger {
    fn severity_label(severity: LogSeverity) -> ColoredString {
        let label = format!("{:<5}", severity);
        let label = label.as_str();
        match severity {
            LogSeverity::Trace => label.dimmed(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }

    fn format_entry(entry: &LogEntry) -> String {
        let local: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "{} {} {} {}",
            local.format("%H:%M:%S%.3f"),
            Self::severity_label(entry.severity),
            entry.source.as_str().magenta(),
            entry.message,
        );
        if let (Some(file), Some(line_number)) = (entry.file, entry.line) {
            line.push_str(&format!(" at {}:{}", file, line_number));
        }
        line
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let line = Self::format_entry(entry);
        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! __prism_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::prism::Prism::log(
            $crate::prism::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a TRACE message
#[macro_export]
macro_rules! prism_trace {
    ($source:expr, $($arg:tt)*) => { $crate::__prism_log!(Trace, $source, $($arg)*) };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! prism_debug {
    ($source:expr, $($arg:tt)*) => { $crate::__prism_log!(Debug, $source, $($arg)*) };
}

/// Log an INFO message
///
/// ```ignore
/// prism_info!("prism::Context", "Context {} created", id);
/// ```
#[macro_export]
macro_rules! prism_info {
    ($source:expr, $($arg:tt)*) => { $crate::__prism_log!(Info, $source, $($arg)*) };
}

/// Log a WARN message
#[macro_export]
macro_rules! prism_warn {
    ($source:expr, $($arg:tt)*) => { $crate::__prism_log!(Warn, $source, $($arg)*) };
}

/// Log an ERROR message along with the file and line that raised it
/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! prism_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::prism::Prism::log_detailed(
            $crate::prism::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
