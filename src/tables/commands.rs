//! Chat commands: key → action descriptor.
//!
//! Persisted as `{"!key": [action, kind, permission, reserved], ...}` where
//! `kind` is `FUNC` or `STATIC` and `permission` is `ADMIN` or empty. Older
//! three-element records and an empty kind load as static replies.

use serde_json::Value;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::handlers::actions::NamedAction;
use crate::store::{Document, DocumentStore};

/// Keys of the commands that manage the command table itself. They can never
/// be deleted through the table.
pub const RESERVED_KEYS: [&str; 2] = ["!addcommand", "!delcommand"];

const KIND_FUNC: &str = "FUNC";
const KIND_STATIC: &str = "STATIC";
const PERMISSION_ADMIN: &str = "ADMIN";

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Public,
    Admin,
}

/// What a command does when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Reply with fixed text. Empty text sends nothing.
    StaticReply(String),
    /// Run a built-in action with the text following the key.
    Function(NamedAction),
}

/// One row of the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    /// Lowercase key, starting with a single `!`.
    pub key: String,
    pub action: CommandAction,
    pub permission: Permission,
}

impl CommandEntry {
    pub fn static_reply(key: impl Into<String>, text: impl Into<String>, permission: Permission) -> Self {
        Self {
            key: key.into().to_lowercase(),
            action: CommandAction::StaticReply(text.into()),
            permission,
        }
    }

    pub fn function(key: impl Into<String>, action: NamedAction, permission: Permission) -> Self {
        Self {
            key: key.into().to_lowercase(),
            action: CommandAction::Function(action),
            permission,
        }
    }

    /// The text following the key, with leading whitespace removed.
    pub fn arguments<'t>(&self, text: &'t str) -> &'t str {
        strip_key(text, &self.key).trim_start()
    }

    fn to_record(&self) -> Value {
        let (action, kind) = match &self.action {
            CommandAction::StaticReply(text) => (text.as_str(), KIND_STATIC),
            CommandAction::Function(action) => (action.name(), KIND_FUNC),
        };
        let permission = match self.permission {
            Permission::Admin => PERMISSION_ADMIN,
            Permission::Public => "",
        };
        Value::from(vec![action, kind, permission, ""])
    }

    fn from_record(key: &str, value: Value) -> Result<Self, StoreError> {
        let malformed = |reason| StoreError::MalformedRecord {
            key: key.to_owned(),
            reason,
        };
        let fields: Vec<String> =
            serde_json::from_value(value).map_err(|_| malformed("expected an array of strings"))?;
        if !(3..=4).contains(&fields.len()) {
            return Err(malformed("expected three or four fields"));
        }
        let permission = if fields[2] == PERMISSION_ADMIN {
            Permission::Admin
        } else {
            Permission::Public
        };
        match fields[1].as_str() {
            KIND_FUNC => {
                let action =
                    NamedAction::resolve(&fields[0]).ok_or_else(|| malformed("unknown function"))?;
                Ok(Self::function(key, action, permission))
            }
            KIND_STATIC | "" => Ok(Self::static_reply(key, fields[0].clone(), permission)),
            _ => Err(malformed("unknown action kind")),
        }
    }
}

/// Result of [`CommandTable::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Updated,
}

/// Result of [`CommandTable::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Insertion-ordered command table backed by a [`DocumentStore`].
pub struct CommandTable {
    entries: Vec<CommandEntry>,
    store: Box<dyn DocumentStore>,
}

impl CommandTable {
    /// Open the table and load the current document.
    pub fn open(store: Box<dyn DocumentStore>) -> Result<Self, StoreError> {
        let mut table = Self {
            entries: Vec::new(),
            store,
        };
        table.reload()?;
        Ok(table)
    }

    /// Replace the in-memory view with the persisted document. Records that
    /// cannot be decoded are skipped.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let doc = self.store.load()?;
        self.entries = doc
            .into_iter()
            .filter_map(|(key, value)| match CommandEntry::from_record(&key, value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping command record");
                    None
                }
            })
            .collect();
        Ok(())
    }

    /// First entry, in insertion order, whose key prefixes `text`
    /// (case-insensitive). With both `!a` and `!ab` present, whichever was
    /// inserted first wins.
    pub fn lookup(&self, text: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|e| after_key(text, &e.key).is_some())
    }

    /// Exact key lookup.
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&CommandEntry> {
        let key = key.to_lowercase();
        self.entries.iter().find(|e| e.key == key)
    }

    /// Insert or replace an entry, persist, then reload.
    ///
    /// The next document is the stored one with this key replaced, so
    /// records the table could not decode are written back untouched.
    pub fn add(&mut self, entry: CommandEntry) -> Result<AddOutcome, StoreError> {
        let mut doc = self.store.load()?;
        let outcome = match doc.insert(entry.key.clone(), entry.to_record()) {
            Some(_) => AddOutcome::Updated,
            None => AddOutcome::Added,
        };
        self.persist(doc)?;
        info!(key = %entry.key, ?outcome, "command saved");
        Ok(outcome)
    }

    /// Remove an entry, persist, then reload. Reserved keys report
    /// [`DeleteOutcome::NotFound`].
    pub fn delete(&mut self, key: &str) -> Result<DeleteOutcome, StoreError> {
        let key = key.to_lowercase();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Ok(DeleteOutcome::NotFound);
        }
        let mut doc = self.store.load()?;
        if doc.shift_remove(&key).is_none() {
            return Ok(DeleteOutcome::NotFound);
        }
        self.persist(doc)?;
        info!(key = %key, "command deleted");
        Ok(DeleteOutcome::Deleted)
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
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

/// The rest of `text` after a leading `key`, compared case-insensitively.
///
/// Lowercasing can change a character's byte length (`K` KELVIN SIGN becomes
/// `k`), so the prefix is walked one character at a time and the remainder
/// is sliced at the matching character boundary of the original text.
pub(crate) fn after_key<'t>(text: &'t str, key: &str) -> Option<&'t str> {
    let mut lowered = String::with_capacity(key.len());
    for (idx, ch) in text.char_indices() {
        if lowered.len() >= key.len() {
            return (lowered == key).then(|| &text[idx..]);
        }
        lowered.extend(ch.to_lowercase());
    }
    (lowered == key).then_some("")
}

/// `text` minus a leading `key`, or `text` unchanged when it does not start
/// with `key`.
pub(crate) fn strip_key<'t>(text: &'t str, key: &str) -> &'t str {
    after_key(text, key).unwrap_or(text)
}
