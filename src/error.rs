//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key has no live record (never written, deleted, expired or burned)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key does not resolve to any mounted backend
    #[error("No backend mounted for key: {0}")]
    NoMount(String),

    /// Mount path is empty or contains a separator
    #[error("Invalid mount path: {0:?}")]
    InvalidMount(String),

    /// Two mounts share the same path
    #[error("Mount path already registered: {0}")]
    DuplicateMount(String),

    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// More than one write option tried to set an expiry
    #[error("Invalid write options: duplicate expiry")]
    DuplicateExpiry,

    /// Operation was cancelled before the backend lock was acquired
    #[error("Operation cancelled")]
    Cancelled,

    /// Backend returned an error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Returns true if this error means "no live record" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
