//! Per-channel, per-day text files.
//!
//! Layout: `<root>/<channel>/<channel>_<Month>_<DD>_<YYYY>.txt`, e.g.
//! `local_logs/mychan/mychan_March_07_2026.txt`.

use super::{ChatLog, HistoryError};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub struct DailyFileLog {
    root: PathBuf,
    channels: HashSet<String>,
}

impl DailyFileLog {
    pub fn new(root: impl Into<PathBuf>, channels: impl IntoIterator<Item = String>) -> Self {
        Self {
            root: root.into(),
            channels: channels.into_iter().collect(),
        }
    }

    /// File holding `channel`'s log for `date`.
    pub fn path_for(&self, channel: &str, date: NaiveDate) -> PathBuf {
        let name = format!("{channel}_{}.txt", date.format("%B_%d_%Y"));
        self.root.join(channel).join(name)
    }

    async fn append_on(&self, channel: &str, line: &str, date: NaiveDate) -> Result<(), HistoryError> {
        let path = self.path_for(channel, date);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ChatLog for DailyFileLog {
    fn records(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    async fn append(&self, channel: &str, line: &str) -> Result<(), HistoryError> {
        self.append_on(channel, line, Local::now().date_naive()).await
    }
}
