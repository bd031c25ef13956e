//! Built-in actions a command can run.
//!
//! The set is closed: persisted `FUNC` records name one of these by its
//! string id, and the name is resolved once when the command table loads.
//! Every action takes the text following the command key and never fails;
//! bad input produces an instructional reply instead.

use crate::tables::{CommandEntry, DurationSpec, Permission};

pub const NEW_COMMAND_USAGE: &str = "!addcommand requires a command name and an argument";
pub const TIMEOUT_USAGE: &str = "!timeout requires a duration (e.g. 10m) and a username";
pub const UNTIMEOUT_USAGE: &str = "!untimeout requires a username";

const SEARCH_URL: &str = "http://google.com/search?q=";

/// A built-in function a `FUNC` command can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedAction {
    /// Build a search link from the arguments.
    Google,
    /// Define a new static command.
    NewCommand,
    /// Time a user out for a duration.
    TimeoutUser,
    /// Lift a user's timeout.
    Untimeout,
}

/// What an action asks the dispatcher to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutput {
    /// Send one message to the channel. Empty text sends nothing.
    Reply(String),
    /// Send several messages to the channel, in order.
    Replies(Vec<String>),
    /// Add this entry to the command table.
    Define(CommandEntry),
}

impl NamedAction {
    pub const ALL: [Self; 4] = [
        Self::Google,
        Self::NewCommand,
        Self::TimeoutUser,
        Self::Untimeout,
    ];

    /// Id used in persisted records.
    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::NewCommand => "new_command",
            Self::TimeoutUser => "timeout_user",
            Self::Untimeout => "untimeout",
        }
    }

    /// Resolve a persisted id.
    pub fn resolve(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    pub fn invoke(self, arguments: &str) -> ActionOutput {
        match self {
            Self::Google => ActionOutput::Reply(google(arguments)),
            Self::NewCommand => new_command(arguments),
            Self::TimeoutUser => timeout_user(arguments),
            Self::Untimeout => untimeout(arguments),
        }
    }
}

/// The moderation action: a timeout directive followed by a public notice.
pub fn timeout(username: &str, duration: &DurationSpec) -> [String; 2] {
    [
        format!("/timeout {username} {}", duration.seconds()),
        format!("{duration} {username} for prohibited phrase"),
    ]
}

/// `neat thing` → `http://google.com/search?q=neat+thing`; no terms → empty.
fn google(arguments: &str) -> String {
    let terms: Vec<&str> = arguments.split(' ').filter(|t| !t.is_empty()).collect();
    if terms.is_empty() {
        return String::new();
    }
    format!("{SEARCH_URL}{}", terms.join("+"))
}

/// `!key reply text` defines a public command; `!!key reply text` defines an
/// admin-only command stored under `!key`.
fn new_command(arguments: &str) -> ActionOutput {
    let usage = || ActionOutput::Reply(NEW_COMMAND_USAGE.to_owned());

    let Some((command, reply)) = arguments.split_once(' ') else {
        return usage();
    };
    if !command.starts_with('!') {
        return usage();
    }
    let (key, permission) = match command.strip_prefix("!!") {
        Some(rest) => (format!("!{rest}"), Permission::Admin),
        None => (command.to_owned(), Permission::Public),
    };
    if key.len() < 2 {
        return usage();
    }
    ActionOutput::Define(CommandEntry::static_reply(key, reply, permission))
}

/// `<duration> <username>`
fn timeout_user(arguments: &str) -> ActionOutput {
    let mut parts = arguments.split(' ');
    let (Some(duration), Some(username)) = (parts.next(), parts.next()) else {
        return ActionOutput::Reply(TIMEOUT_USAGE.to_owned());
    };
    match DurationSpec::parse(&duration.to_lowercase()) {
        Some(spec) if !username.is_empty() => ActionOutput::Replies(timeout(username, &spec).into()),
        _ => ActionOutput::Reply(TIMEOUT_USAGE.to_owned()),
    }
}

/// `<username>`
fn untimeout(arguments: &str) -> ActionOutput {
    match arguments.split(' ').next().filter(|u| !u.is_empty()) {
        Some(username) => ActionOutput::Reply(format!("/untimeout {username}")),
        None => ActionOutput::Reply(UNTIMEOUT_USAGE.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CommandAction;

    #[test]
    fn test_resolve_round_trips_every_name() {
        for action in NamedAction::ALL {
            assert_eq!(NamedAction::resolve(action.name()), Some(action));
        }
        assert_eq!(NamedAction::resolve("rm_rf"), None);
    }

    #[test]
    fn test_google() {
        assert_eq!(
            NamedAction::Google.invoke("cute cats"),
            ActionOutput::Reply("http://google.com/search?q=cute+cats".into())
        );
        assert_eq!(
            NamedAction::Google.invoke("  neat   thing "),
            ActionOutput::Reply("http://google.com/search?q=neat+thing".into())
        );
        assert_eq!(NamedAction::Google.invoke("   "), ActionOutput::Reply(String::new()));
    }

    #[test]
    fn test_new_command_public() {
        let ActionOutput::Define(entry) = NamedAction::NewCommand.invoke("!Hello hi there friend") else {
            panic!("expected a definition");
        };
        assert_eq!(entry.key, "!hello");
        assert_eq!(entry.action, CommandAction::StaticReply("hi there friend".into()));
        assert_eq!(entry.permission, Permission::Public);
    }

    #[test]
    fn test_new_command_double_marker_is_admin() {
        let ActionOutput::Define(entry) = NamedAction::NewCommand.invoke("!!secret hi there") else {
            panic!("expected a definition");
        };
        assert_eq!(entry.key, "!secret");
        assert_eq!(entry.permission, Permission::Admin);
    }

    #[test]
    fn test_new_command_bad_input_is_instructional() {
        for bad in ["", "!lonely", "nobang reply", "! reply", "!! reply"] {
            assert_eq!(
                NamedAction::NewCommand.invoke(bad),
                ActionOutput::Reply(NEW_COMMAND_USAGE.into()),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_timeout_message_pair() {
        let spec = DurationSpec::parse("10m").unwrap();
        assert_eq!(
            timeout("user", &spec),
            [
                "/timeout user 600".to_string(),
                "10m user for prohibited phrase".to_string()
            ]
        );
    }

    #[test]
    fn test_timeout_user() {
        assert_eq!(
            NamedAction::TimeoutUser.invoke("2H troll"),
            ActionOutput::Replies(vec![
                "/timeout troll 7200".into(),
                "2h troll for prohibited phrase".into()
            ])
        );
        for bad in ["", "10m", "soon troll", "10m "] {
            assert_eq!(
                NamedAction::TimeoutUser.invoke(bad),
                ActionOutput::Reply(TIMEOUT_USAGE.into()),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_untimeout() {
        assert_eq!(
            NamedAction::Untimeout.invoke("troll extra"),
            ActionOutput::Reply("/untimeout troll".into())
        );
        assert_eq!(
            NamedAction::Untimeout.invoke(""),
            ActionOutput::Reply(UNTIMEOUT_USAGE.into())
        );
    }
}
