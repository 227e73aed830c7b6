//! Error types for the IRC protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Message exceeded maximum allowed length.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual message length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// Underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors that can occur while parsing a single IRC message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The message string was empty.
    #[error("empty message")]
    EmptyMessage,

    /// The command token was missing or malformed.
    #[error("invalid command")]
    InvalidCommand,

    /// A command was recognized but its parameters were wrong.
    #[error("{command} requires {expected} parameter(s), got {actual}")]
    MissingParams {
        /// The command name.
        command: &'static str,
        /// Minimum number of parameters the command needs.
        expected: usize,
        /// Number of parameters actually present.
        actual: usize,
    },
}
