//! Outbound protocol frames.
//!
//! A [`Frame`] is one line the client writes to the chat server. `Display`
//! renders the frame without its line terminator; [`crate::LineCodec`]
//! appends `\r\n` when encoding.

use std::fmt;

/// Channel used to relay whispers through the chat server.
pub const WHISPER_RELAY: &str = "jtv";

/// Capability requested after registration so the server emits Twitch
/// specific commands such as `WHISPER`, `USERSTATE` and `CLEARCHAT`.
pub const COMMANDS_CAPABILITY: &str = "twitch.tv/commands";

/// A single outbound line.
#[derive(Clone, PartialEq, Eq)]
pub enum Frame {
    /// `PASS <credential>`
    Pass(String),
    /// `NICK <name>`
    Nick(String),
    /// `JOIN #<channel>`
    Join(String),
    /// `CAP REQ :<capability>`
    CapReq(String),
    /// `PRIVMSG #<channel> :<text>`
    Privmsg {
        /// Channel name without the leading `#`.
        channel: String,
        /// Message text.
        text: String,
    },
    /// `PRIVMSG #jtv :/w <user> <text>`
    Whisper {
        /// Recipient username.
        user: String,
        /// Message text.
        text: String,
    },
    /// `PONG :<token>`
    Pong(String),
}

impl Frame {
    /// Build a channel message frame.
    pub fn privmsg(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Privmsg {
            channel: channel.into(),
            text: text.into(),
        }
    }

    /// Build a whisper frame.
    pub fn whisper(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Whisper {
            user: user.into(),
            text: text.into(),
        }
    }

    /// Build the keep-alive reply for a PING token.
    pub fn pong(token: impl Into<String>) -> Self {
        Self::Pong(token.into())
    }

    /// The registration sequence: credential, nick, one JOIN per channel,
    /// then the commands capability request.
    pub fn registration<'a>(
        name: &str,
        credential: &str,
        channels: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Frame> {
        let mut frames = vec![
            Frame::Pass(credential.to_owned()),
            Frame::Nick(name.to_owned()),
        ];
        frames.extend(channels.into_iter().map(|c| Frame::Join(c.to_owned())));
        frames.push(Frame::CapReq(COMMANDS_CAPABILITY.to_owned()));
        frames
    }

    /// Command token of the frame, for diagnostics.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Nick(_) => "NICK",
            Self::Join(_) => "JOIN",
            Self::CapReq(_) => "CAP",
            Self::Privmsg { .. } | Self::Whisper { .. } => "PRIVMSG",
            Self::Pong(_) => "PONG",
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(credential) => write!(f, "PASS {credential}"),
            Self::Nick(name) => write!(f, "NICK {name}"),
            Self::Join(channel) => write!(f, "JOIN #{channel}"),
            Self::CapReq(cap) => write!(f, "CAP REQ :{cap}"),
            Self::Privmsg { channel, text } => write!(f, "PRIVMSG #{channel} :{text}"),
            Self::Whisper { user, text } => {
                write!(f, "PRIVMSG #{WHISPER_RELAY} :/w {user} {text}")
            }
            Self::Pong(token) => write!(f, "PONG :{token}"),
        }
    }
}

// Credentials must never reach the logs.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(_) => f.write_str("PASS <redacted>"),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privmsg_serialization() {
        let frame = Frame::privmsg("mychan", "http://google.com/search?q=cute+cats");
        assert_eq!(
            frame.to_string(),
            "PRIVMSG #mychan :http://google.com/search?q=cute+cats"
        );
    }

    #[test]
    fn test_whisper_goes_through_relay_channel() {
        let frame = Frame::whisper("admin", "Hey! I'm whispering!");
        assert_eq!(frame.to_string(), "PRIVMSG #jtv :/w admin Hey! I'm whispering!");
    }

    #[test]
    fn test_registration_sequence() {
        let frames = Frame::registration("maestro", "oauth:abc", ["one", "two"]);
        let lines: Vec<String> = frames.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "PASS oauth:abc",
                "NICK maestro",
                "JOIN #one",
                "JOIN #two",
                "CAP REQ :twitch.tv/commands",
            ]
        );
    }

    #[test]
    fn test_debug_redacts_credential() {
        let frame = Frame::Pass("oauth:secret".into());
        assert_eq!(format!("{frame:?}"), "PASS <redacted>");
        assert_eq!(frame.command(), "PASS");
    }
}
