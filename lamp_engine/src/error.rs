//! Error types for the Lamp engine
//!
//! This module defines the error types used throughout the engine:
//! registry lookups, lifecycle misuse, manifest loading and backend failures.

use std::fmt;

/// Result type for Lamp engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lamp engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Lookup of a name that is not registered
    NotFound(String),

    /// Initialize called on something that is already initialized
    DoubleInitialize(String),

    /// Access to a subsystem that has not been initialized (or was shut down)
    UninitializedAccess(String),

    /// Invalid resource (bad descriptor, wrong pipeline type, etc.)
    InvalidResource(String),

    /// Render manifest could not be read or parsed
    ManifestError(String),

    /// Backend-specific error (Vulkan, poisoned lock, etc.)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(name) => write!(f, "Not found: {}", name),
            Error::DoubleInitialize(msg) => write!(f, "Already initialized: {}", msg),
            Error::UninitializedAccess(msg) => write!(f, "Not initialized: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::ManifestError(msg) => write!(f, "Manifest error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an [`Error`], log it at ERROR severity and evaluate to it
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("lamp::NameRegistry", NotFound, "{}", name);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lamp::Error::$variant(message)
    }};
}

/// Log an error and return it from the current function
///
/// # Example
///
/// ```ignore
/// engine_bail!("lamp::Engine", DoubleInitialize, "Render registries already exist");
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
