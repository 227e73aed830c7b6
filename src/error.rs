//! Session-level error handling.
//!
//! Every variant here is transient from the process's point of view: a
//! failed session logs the error and schedules a reconnect, it never takes
//! the process down.

use std::time::Duration;
use thiserror::Error;

/// Errors that can end one connection attempt.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] lurk_proto::ProtocolError),

    #[error("invalid TLS server name: {0}")]
    TlsName(String),

    #[error("connection idle for {0:?}, treating as dead")]
    IdleTimeout(Duration),

    #[error("connection closed by server")]
    Closed,
}

/// Result type for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
