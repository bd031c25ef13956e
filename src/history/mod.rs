//! Chat log abstraction.
//!
//! Recorded channels get one plain-text file per calendar day. Appends are
//! best effort: callers log a failure and keep going.

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod noop;

pub use file::DailyFileLog;
pub use noop::NoOpLog;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ChatLog: Send + Sync {
    /// Whether lines for `channel` are kept.
    fn records(&self, channel: &str) -> bool;

    /// Append one line to today's file for `channel`.
    async fn append(&self, channel: &str, line: &str) -> Result<(), HistoryError>;
}

/// `[HH:MM:SS] sender: text`
pub fn format_line(timestamp: &str, sender: &str, text: &str) -> String {
    format!("{timestamp} {sender}: {text}")
}
