//! Classification of raw inbound lines.
//!
//! [`classify`] turns one line from the chat server into a [`ParsedEvent`].
//! Checks run in a fixed order: channel message, whisper, keep-alive,
//! authentication failure, noisy server notice, and finally everything else.
//! A line shaped like a channel message or whisper whose fields cannot be
//! extracted degrades to [`ParsedEvent::Unrecognized`] carrying the
//! [`ParseError`], so callers can log it and keep reading.

use chrono::{Local, NaiveTime};

use crate::error::ParseError;

/// Server message types that are suppressed from output.
pub const SERVER_NOISE: [&str; 4] = ["USERSTATE", "NOTICE", "CLEARCHAT", "USERNOTICE"];

const AUTH_FAILURE: &str = "NOTICE * :Login authentication failed";
const PING_MARKER: &str = "PING :";
const TWITCH_HOST: &str = "tmi.twitch.tv";

/// A message posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel name without the leading `#`.
    pub channel: String,
    /// Local receipt time, `[HH:MM:SS]`.
    pub timestamp: String,
    /// Username of the author.
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// A private one-to-one message addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whisper {
    /// Local receipt time, `[HH:MM:SS]`.
    pub timestamp: String,
    /// Username of the author.
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// One classified inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    /// `PRIVMSG #channel :text`
    ChatMessage(ChatMessage),
    /// `WHISPER recipient :text`
    Whisper(Whisper),
    /// Server keep-alive; the token must be echoed in the `PONG`.
    Ping {
        /// Text following `PING :`.
        token: String,
    },
    /// The server rejected the credential. Fatal.
    AuthFailure,
    /// Noisy server traffic that is neither shown nor acted upon.
    ServerNotice {
        /// The command token, one of [`SERVER_NOISE`].
        kind: String,
    },
    /// Anything else, surfaced for visibility only.
    Unrecognized {
        /// The raw line.
        line: String,
        /// Why a message-shaped line could not be parsed.
        reason: Option<ParseError>,
    },
}

/// Classify a raw line, stamping it with the current local time.
pub fn classify(line: &str) -> ParsedEvent {
    classify_at(line, Local::now().time())
}

/// Classify a raw line received at `received`.
pub fn classify_at(line: &str, received: NaiveTime) -> ParsedEvent {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(head) = Head::split(line) {
        let timestamp = || received.format("[%H:%M:%S]").to_string();
        let parsed = match head.command {
            "PRIVMSG" => Some(head.chat_message(timestamp()).map(ParsedEvent::ChatMessage)),
            "WHISPER" => Some(head.whisper(timestamp()).map(ParsedEvent::Whisper)),
            _ => None,
        };
        if let Some(parsed) = parsed {
            return parsed.unwrap_or_else(|reason| ParsedEvent::Unrecognized {
                line: line.to_owned(),
                reason: Some(reason),
            });
        }
    }

    if let Some(idx) = line.find(PING_MARKER) {
        return ParsedEvent::Ping {
            token: line[idx + PING_MARKER.len()..].to_owned(),
        };
    }

    if line.contains(AUTH_FAILURE) {
        return ParsedEvent::AuthFailure;
    }

    if let Some(kind) = line.split(' ').nth(1)
        && SERVER_NOISE.contains(&kind)
    {
        return ParsedEvent::ServerNotice {
            kind: kind.to_owned(),
        };
    }

    ParsedEvent::Unrecognized {
        line: line.to_owned(),
        reason: None,
    }
}

/// Source, command and parameters of a line sent on behalf of a chat user.
struct Head<'a> {
    source: &'a str,
    command: &'a str,
    params: &'a str,
}

impl<'a> Head<'a> {
    /// Split `[@tags ]:source COMMAND params`. The source may also be written
    /// `@host`. Returns `None` unless the source is a chat server host.
    fn split(line: &'a str) -> Option<Self> {
        let mut rest = line;

        // IRCv3 tag block, present when tags are negotiated
        if let Some((first, after)) = rest.split_once(' ')
            && first.starts_with('@')
            && first.contains('=')
        {
            rest = after.trim_start_matches(' ');
        }

        let (source, after) = rest.split_once(' ')?;
        let source = source
            .strip_prefix(':')
            .or_else(|| source.strip_prefix('@'))?;
        if !source.ends_with(TWITCH_HOST) {
            return None;
        }

        let (command, params) = after.split_once(' ').unwrap_or((after, ""));
        Some(Self {
            source,
            command,
            params,
        })
    }

    /// `nick!user@host` yields `nick`; a bare `nick.tmi.twitch.tv` yields `nick`.
    fn sender(&self) -> Result<String, ParseError> {
        let nick = match self.source.split_once('!') {
            Some((nick, _)) => nick,
            None => self
                .source
                .strip_suffix(TWITCH_HOST)
                .map(|s| s.trim_end_matches('.'))
                .unwrap_or(self.source),
        };
        if nick.is_empty() {
            return Err(ParseError::MissingSender);
        }
        Ok(nick.to_owned())
    }

    /// Target token and trailing text, split at the first `:`.
    fn target_and_text(&self, command: &'static str) -> Result<(&'a str, &'a str), ParseError> {
        if self.params.trim().is_empty() {
            return Err(ParseError::MissingTarget { command });
        }
        let (before, text) = self.params.split_once(':').ok_or(ParseError::MissingText)?;
        let target = before
            .split_whitespace()
            .next()
            .ok_or(ParseError::MissingTarget { command })?;
        Ok((target, text))
    }

    fn chat_message(&self, timestamp: String) -> Result<ChatMessage, ParseError> {
        let sender = self.sender()?;
        let (target, text) = self.target_and_text("PRIVMSG")?;
        let channel = target
            .strip_prefix('#')
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ParseError::NotAChannel(target.to_owned()))?;
        Ok(ChatMessage {
            channel: channel.to_owned(),
            timestamp,
            sender,
            text: text.to_owned(),
        })
    }

    fn whisper(&self, timestamp: String) -> Result<Whisper, ParseError> {
        let sender = self.sender()?;
        let (_recipient, text) = self.target_and_text("WHISPER")?;
        Ok(Whisper {
            timestamp,
            sender,
            text: text.to_owned(),
        })
    }
}
