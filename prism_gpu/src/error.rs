//! Error types for Prism
//!
//! Every fallible operation of the texture lifecycle returns [`Result`].
//! Errors are usually built through [`prism_err!`] / [`prism_bail!`], which
//! log the message at ERROR severity (with file:line) before handing it back.

use std::fmt;

/// Result type for Prism operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Native allocation failed or the pool is exhausted
    AllocationFailure(String),

    /// Descriptor / color type / alpha type combination the backend cannot use
    UnsupportedCombination(String),

    /// A promise image's fulfill callback produced no usable texture
    FulfillFailure(String),

    /// A resource was used with a context other than the one that created it
    ContextMismatch(String),

    /// Degenerate input rejected before any native call
    InvalidArgument(String),

    /// Reading pixels back from a texture failed
    ReadbackFailed(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Backend-specific error (Vulkan, Metal, Dawn)
    BackendError(String),

    /// Initialization failed (context, backend, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocationFailure(msg) => write!(f, "Allocation failure: {}", msg),
            Error::UnsupportedCombination(msg) => write!(f, "Unsupported combination: {}", msg),
            Error::FulfillFailure(msg) => write!(f, "Fulfill failure: {}", msg),
            Error::ContextMismatch(msg) => write!(f, "Context mismatch: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::ReadbackFailed(msg) => write!(f, "Readback failed: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`] of the given variant, logging it at ERROR severity first
///
/// # Example
///
/// ```ignore
/// let err = prism_err!("prism::Context", ContextMismatch, "recording {} is foreign", id);
/// ```
#[macro_export]
macro_rules! prism_err {
    ($source:expr, $kind:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::prism::Prism::log_detailed(
            $crate::prism::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::prism::Error::$kind(message)
    }};
}

/// Log and return an [`Error`] of the given variant from the current function
///
/// # Example
///
/// ```ignore
/// prism_bail!("prism::DescriptorPool", InvalidArgument, "max_sets must be > 0");
/// ```
#[macro_export]
macro_rules! prism_bail {
    ($source:expr, $kind:ident, $($arg:tt)*) => {
        return Err($crate::prism_err!($source, $kind, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
