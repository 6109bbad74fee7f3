//! Error types for devlink
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for devlink operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("framing error: {0}")]
    Framing(String),

    #[error("packet capacity exceeded: {0}")]
    Capacity(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("bus is not connected")]
    NotConnected,

    #[error("timed out waiting for response")]
    Timeout,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// True for errors the caller can recover from by discarding the
    /// current frame and retrying the request on the same connection.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LinkError::Framing(_) | LinkError::Capacity(_) | LinkError::Timeout
        )
    }
}
