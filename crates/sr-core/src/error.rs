//! Error types for the symreg engine.

use thiserror::Error;

/// Engine error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller broke an API contract (malformed tree, unknown variable
    /// hash, mis-sized output span, missing kernel registration, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A runtime/resource failure (e.g. a thread pool could not be built).
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
