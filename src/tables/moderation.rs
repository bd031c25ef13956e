//! Prohibited phrases and the timeout each one earns.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::store::{Document, DocumentStore};

static DURATION_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[smhd]$").expect("duration pattern is valid"));

/// A timeout length such as `30s`, `10m`, `2h` or `1d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSpec {
    raw: String,
    amount: u64,
    unit: char,
}

impl DurationSpec {
    /// Accepts exactly `^[0-9]+[smhd]$`. Amounts that do not fit in a `u64`
    /// are rejected as well.
    pub fn parse(raw: &str) -> Option<Self> {
        if !DURATION_SPEC.is_match(raw) {
            return None;
        }
        let (digits, unit) = raw.split_at(raw.len() - 1);
        Some(Self {
            raw: raw.to_owned(),
            amount: digits.parse().ok()?,
            unit: unit.chars().next()?,
        })
    }

    /// Length in seconds.
    pub fn seconds(&self) -> u64 {
        let scale = match self.unit {
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            _ => 1,
        };
        self.amount.saturating_mul(scale)
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Phrase → timeout table, persisted as `{"phrase": "10m", ...}`.
pub struct ModerationTable {
    entries: Vec<(String, DurationSpec)>,
    store: Box<dyn DocumentStore>,
}

impl ModerationTable {
    /// Open the table and load the current document.
    pub fn open(store: Box<dyn DocumentStore>) -> Result<Self, StoreError> {
        let mut table = Self {
            entries: Vec::new(),
            store,
        };
        table.reload()?;
        Ok(table)
    }

    /// Replace the in-memory view with the persisted document.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.entries = decode(self.store.load()?);
        Ok(())
    }

    /// Every entry whose phrase occurs in `text`, in table order.
    pub fn lookup<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (&'a str, &'a DurationSpec)> {
        self.entries
            .iter()
            .filter(move |(phrase, _)| text.contains(phrase.as_str()))
            .map(|(phrase, spec)| (phrase.as_str(), spec))
    }

    /// Add or replace a phrase. An invalid duration is ignored and the table
    /// is left as it was.
    pub fn add(&mut self, phrase: &str, duration: &str) -> Result<(), StoreError> {
        let Some(spec) = DurationSpec::parse(duration) else {
            warn!(phrase, duration, "ignoring prohibited phrase with invalid duration");
            return Ok(());
        };
        let mut doc = self.store.load()?;
        doc.insert(phrase.to_owned(), Value::String(spec.raw));
        self.persist(doc)?;
        info!(phrase, duration, "prohibited phrase added");
        Ok(())
    }

    /// Remove a phrase if present.
    pub fn delete(&mut self, phrase: &str) -> Result<(), StoreError> {
        let mut doc = self.store.load()?;
        if doc.shift_remove(phrase).is_none() {
            return Ok(());
        }
        self.persist(doc)?;
        info!(phrase, "prohibited phrase deleted");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&mut self, doc: Document) -> Result<(), StoreError> {
        self.store.save(&doc)?;
        self.reload()
    }
}

fn decode(doc: Document) -> Vec<(String, DurationSpec)> {
    doc.into_iter()
        .filter_map(|(phrase, value)| {
            let spec = value.as_str().and_then(DurationSpec::parse);
            if spec.is_none() {
                warn!(phrase = %phrase, value = %value, "skipping prohibited phrase with invalid duration");
            }
            spec.map(|spec| (phrase, spec))
        })
        .collect()
}
