//! Admin-only commands that edit the bot's own tables.
//!
//! These work whether or not the command table has an entry for them.

use crate::tables::commands::{after_key, strip_key};

/// A table-editing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    /// `!delcommand <key>`
    DelCommand,
    /// `!add <duration> <phrase...>`
    AddPhrase,
    /// `!del <phrase>`
    DelPhrase,
}

impl LocalCommand {
    /// Match order: `!delcommand` must be tried before its prefix `!del`.
    pub const ALL: [Self; 3] = [Self::DelCommand, Self::AddPhrase, Self::DelPhrase];

    pub fn key(self) -> &'static str {
        match self {
            Self::DelCommand => "!delcommand",
            Self::AddPhrase => "!add",
            Self::DelPhrase => "!del",
        }
    }

    /// The local command a command-table key refers to, if any.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// First local command whose key prefixes `text` (case-insensitive).
    pub fn matching(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| after_key(text, c.key()).is_some())
    }

    /// The text after this command's key.
    pub fn arguments(self, text: &str) -> &str {
        strip_key(text, self.key()).trim_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_prefers_delcommand_over_del() {
        assert_eq!(LocalCommand::matching("!delcommand !x"), Some(LocalCommand::DelCommand));
        assert_eq!(LocalCommand::matching("!DEL word"), Some(LocalCommand::DelPhrase));
        assert_eq!(LocalCommand::matching("!add 10m word"), Some(LocalCommand::AddPhrase));
        assert_eq!(LocalCommand::matching("hello"), None);
    }

    #[test]
    fn test_arguments() {
        assert_eq!(LocalCommand::AddPhrase.arguments("!ADD  10m bad word"), "10m bad word");
        assert_eq!(LocalCommand::from_key("!del"), Some(LocalCommand::DelPhrase));
        assert_eq!(LocalCommand::from_key("!google"), None);
    }
}
