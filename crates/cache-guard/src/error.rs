//! Error types for the cache guard.

/// Errors produced by a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The unit of work was aborted by an injected failure.
    ///
    /// Expected and recoverable: the worker loop reports it and keeps going.
    /// The cache the unit of work held is discarded, never returned.
    #[error("a randomized failure occurred during the unit of work")]
    WorkFailed,
}

/// Result type for cache guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
