//! Error types for the Maya bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
///
/// These never reach a bridge caller directly; the client converts them into
/// a [`crate::BridgeResponse`] at its boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Could not open a connection to the host
    #[error("Socket connection failed: {0}")]
    ConnectError(String),

    /// Connect, write or read exceeded the configured timeout
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Socket I/O failed after the connection was established
    #[error("Socket I/O failed: {0}")]
    IoError(String),

    /// Payload between the sentinels is not well-formed JSON
    #[error("parse-failed: {0}")]
    ParseError(String),

    /// Remote reply grew past the configured ceiling
    #[error("Reply exceeded {0} bytes without an end sentinel")]
    ReplyTooLarge(usize),

    /// Invalid target or envelope configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
