//! Unified error handling for maestro.
//!
//! Each layer has its own error type; [`BotError`] is what ends a bot's
//! connection loop. Everything the dispatcher can recover from locally
//! (malformed lines, bad command arguments, failed log appends) never
//! reaches this level.

use maestro_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Persistence Errors
// ============================================================================

/// Errors raised by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed record for {key:?}: {reason}")]
    MalformedRecord { key: String, reason: &'static str },
}

// ============================================================================
// Connection Errors
// ============================================================================

/// Errors that terminate a bot's connection loop.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// The server rejected the credential. Never retried.
    #[error("login authentication failed")]
    AuthenticationFailed,

    #[error("connection closed by server")]
    ConnectionClosed,
}

impl BotError {
    /// Whether this error must bring the whole process down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }
}
