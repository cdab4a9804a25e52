/// Vulkan Debug Messenger - Routes validation layer messages to the Prism logger
///
/// Messages are filtered by severity and category, counted, grouped by text,
/// and forwarded to `Prism::log` under the `prism::vulkan::validation` source.

use ash::vk;
use colored::*;
use prism_gpu::prism::log::LogSeverity;
use prism_gpu::prism::Prism;
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::vulkan_config::{DebugMessageFilter, DebugSeverity, ValidationStats};

const SOURCE: &str = "prism::vulkan::validation";

/// Global debug configuration (shared across callbacks)
static DEBUG_CONFIG: Mutex<Option<Config>> = Mutex::new(None);

/// Global validation statistics
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Occurrences of each message text
static MESSAGE_TRACKER: Mutex<Option<FxHashMap<String, u32>>> = Mutex::new(None);

/// Debug configuration for the callback
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    pub severity: DebugSeverity,
    pub message_filter: DebugMessageFilter,
    pub panic_on_error: bool,
    pub enable_stats: bool,
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn counter(&self, severity: LogSeverity) -> &AtomicU32 {
        match severity {
            LogSeverity::Error => &self.errors,
            LogSeverity::Warn => &self.warnings,
            LogSeverity::Info => &self.info,
            LogSeverity::Debug | LogSeverity::Trace => &self.verbose,
        }
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

// A panicking callback must not wedge every later one
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initialize debug configuration and reset the statistics
pub(crate) fn init_debug_config(config: Config) {
    VALIDATION_STATS.reset();
    *lock(&MESSAGE_TRACKER) = Some(FxHashMap::default());
    *lock(&DEBUG_CONFIG) = Some(config);
}

/// Stop reporting; called before the messenger is destroyed
pub(crate) fn cleanup_debug_config() {
    *lock(&DEBUG_CONFIG) = None;
}

/// Severity flags the messenger subscribes to
pub(crate) fn severity_flags(severity: DebugSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    match severity {
        DebugSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        DebugSeverity::ErrorsAndWarnings => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        }
        DebugSeverity::All => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        }
    }
}

fn log_severity(message_severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Debug
    }
}

fn category(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

fn is_shown(config: &Config, severity: LogSeverity, message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> bool {
    let severity_shown = match config.severity {
        DebugSeverity::ErrorsOnly => severity == LogSeverity::Error,
        DebugSeverity::ErrorsAndWarnings => matches!(severity, LogSeverity::Error | LogSeverity::Warn),
        DebugSeverity::All => true,
    };
    let filter = &config.message_filter;
    let category_shown = match category(message_type) {
        "Validation" => filter.show_validation,
        "Performance" => filter.show_performance,
        _ => filter.show_general,
    };
    severity_shown && category_shown
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());

    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }

    println!("  {} {}", "Total:".white().bold(), stats.total());

    if let Some(tracker) = lock(&MESSAGE_TRACKER).as_ref() {
        let repeated = tracker.values().filter(|&&count| count > 1).count();
        if repeated > 0 {
            println!("\n  {} {} message(s) appeared multiple times", "ℹ".cyan(), repeated);
        }
    }

    println!("{}\n", "====================================".bright_blue().bold());
}

unsafe fn c_str<'a>(ptr: *const std::os::raw::c_char, fallback: &'a str) -> std::borrow::Cow<'a, str> {
    if ptr.is_null() {
        std::borrow::Cow::Borrowed(fallback)
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

/// Vulkan debug messenger callback
///
/// Called by the validation layers when they detect an issue. Always returns
/// `vk::FALSE` so the offending call is not aborted.
pub(crate) unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let config = match *lock(&DEBUG_CONFIG) {
        Some(config) => config,
        None => return vk::FALSE,
    };

    let severity = log_severity(message_severity);
    if !is_shown(&config, severity, message_type) {
        return vk::FALSE;
    }

    let callback_data = &*p_callback_data;
    let message_id_name = c_str(callback_data.p_message_id_name, "Unknown");
    let message = c_str(callback_data.p_message, "No message");

    let occurrences = if config.enable_stats {
        VALIDATION_STATS.counter(severity).fetch_add(1, Ordering::Relaxed);
        let mut tracker = lock(&MESSAGE_TRACKER);
        let count = tracker
            .get_or_insert_with(FxHashMap::default)
            .entry(message.to_string())
            .or_insert(0);
        *count += 1;
        *count
    } else {
        1
    };

    let repeat = if occurrences > 1 { format!(" [x{}]", occurrences) } else { String::new() };
    Prism::log(
        severity,
        SOURCE,
        format!("[{}]{} {}: {}", category(message_type), repeat, message_id_name, message),
    );

    if config.panic_on_error && severity == LogSeverity::Error {
        panic!("Vulkan validation error (strict mode)\nMessage ID: {}\nMessage: {}", message_id_name, message);
    }

    vk::FALSE
}
