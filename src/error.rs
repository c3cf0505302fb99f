//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache crate.
///
/// Cache operations themselves never fail: a missing key is a normal
/// outcome, and producer failures are handed back to the caller untouched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// An environment variable held a value that could not be parsed
    #[error("Invalid configuration: {var}={value:?}")]
    InvalidConfig {
        /// Variable name
        var: &'static str,
        /// Raw value that failed to parse
        value: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
