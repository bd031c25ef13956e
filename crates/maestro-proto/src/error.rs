//! Error types for the chat protocol library.
//!
//! [`ProtocolError`] covers transport-level failures surfaced by the codec.
//! [`ParseError`] describes why a line that looked like a chat message or
//! whisper could not be broken into fields; it travels inside
//! [`crate::ParsedEvent::Unrecognized`] instead of aborting the read loop.

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
}

/// Field extraction failures for lines shaped like PRIVMSG or WHISPER.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The source prefix was missing or empty.
    #[error("missing sender prefix")]
    MissingSender,

    /// The target parameter was missing.
    #[error("missing target after {command}")]
    MissingTarget {
        /// Command token the target should have followed.
        command: &'static str,
    },

    /// A PRIVMSG target did not name a channel.
    #[error("target {0:?} is not a channel")]
    NotAChannel(String),

    /// The trailing ` :` text delimiter was absent.
    #[error("missing ':' before message text")]
    MissingText,
}
