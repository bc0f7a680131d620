//! Error types for the usher engine
//!
//! The runtime degradation paths (stalled readiness signals, stale
//! navigation callbacks, registration overflow, low frame rate) are not
//! errors: they recover silently or by rejection. Errors exist only at
//! real fault boundaries such as configuration loading and anchor lookup.

use thiserror::Error;

/// Errors that can occur in the usher engine
#[derive(Error, Debug)]
pub enum UsherError {
    /// Failed to read or parse configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A scroll target names an anchor that was never registered
    #[error("unknown scroll anchor: {0}")]
    UnknownAnchor(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for UsherError {
    fn from(err: anyhow::Error) -> Self {
        UsherError::Other(err.to_string())
    }
}

/// Result type for usher operations
pub type Result<T> = std::result::Result<T, UsherError>;
