//! Error types for RespKV
//!
//! Provides a unified error type for all fallible operations. Errors that are
//! answered to the client as an error reply (unknown command, wrong arity)
//! live in [`crate::command::CommandError`] instead.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for RespKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The stream ended inside a value
    #[error("Protocol error: stream ended mid-value ({0})")]
    Incomplete(String),

    // -------------------------------------------------------------------------
    // AOF Errors
    // -------------------------------------------------------------------------
    #[error("AOF corruption detected: {0}")]
    AofCorruption(String),

    #[error("AOF write failed: {0}")]
    AofWrite(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// True when the error means the peer went away at a value boundary
    /// or mid-value, rather than sending garbage.
    pub fn is_disconnect(&self) -> bool {
        match self {
            KvError::Incomplete(_) => true,
            KvError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
