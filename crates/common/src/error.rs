//! Universal error types for Vantage.

use thiserror::Error;

/// Top-level error type for all Vantage operations.
///
/// `Clone` is derived: a failed fetch is delivered to every caller coalesced
/// onto the same in-flight request, so errors must be shareable.
#[derive(Debug, Clone, Error)]
pub enum VantageError {
    #[error("Provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type VantageResult<T> = Result<T, VantageError>;
