//! No-op chat log that records nothing.
//!
//! Used when no channel is configured for recording.

use super::{ChatLog, HistoryError};
use async_trait::async_trait;

pub struct NoOpLog;

#[async_trait]
impl ChatLog for NoOpLog {
    fn records(&self, _channel: &str) -> bool {
        false
    }

    async fn append(&self, _channel: &str, _line: &str) -> Result<(), HistoryError> {
        Ok(())
    }
}
