//! Universal error types for Crypto Info.
//!
//! Provider clients use these internally and convert them into empty
//! records at their public boundary; only configuration and delivery
//! errors ever reach the binaries.

use thiserror::Error;

/// Top-level error type for all Crypto Info operations.
#[derive(Debug, Error)]
pub enum CinfoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error ({provider}): {message}")]
    Protocol {
        provider: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown pair: {0}")]
    UnknownPair(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The messaging platform refused a message. `details` holds the
    /// per-field messages of the platform's error body as `property: message`.
    #[error("Delivery failed (HTTP {status}): {message}")]
    Delivery {
        status: u16,
        message: String,
        details: Vec<String>,
    },

    #[error("Invalid webhook signature")]
    InvalidSignature,
}

pub type CinfoResult<T> = Result<T, CinfoError>;
