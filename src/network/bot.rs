//! Bot - one chat identity on one server connection.
//!
//! ```text
//!   register (PASS, NICK, JOIN..., CAP REQ)
//!        ↓
//!   ┌──────────────────────────────────────────┐
//!   │ read line (bounded by idle timeout)      │
//!   │   ↓                                      │
//!   │ classify → log → Dispatcher → effects    │
//!   │   ↓                                      │
//!   │ send frames, record sends, log replies   │
//!   └──────────── until terminate ─────────────┘
//! ```
//!
//! Every effect of one inbound line is applied before the next line is read,
//! so the tables and the rate limiter never see concurrent access.

use chrono::{Local, Utc};
use futures_util::{SinkExt, StreamExt};
use maestro_proto::{ChatMessage, Frame, LineCodec, ParsedEvent, Whisper, classify};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::config::{BotConfig, ServerConfig};
use crate::error::BotError;
use crate::handlers::{BotEffect, Dispatcher};
use crate::history::{ChatLog, DailyFileLog, NoOpLog, format_line};
use crate::security::RateLimiter;
use crate::store::JsonFileStore;
use crate::tables::{CommandTable, ModerationTable};

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// A chat bot bound to its identity, channels, and dispatcher.
pub struct Bot {
    name: String,
    credential: String,
    channels: Vec<String>,
    idle_timeout: Duration,
    dispatcher: Dispatcher,
    chat_log: Box<dyn ChatLog>,
}

impl Bot {
    pub fn new(
        name: impl Into<String>,
        credential: impl Into<String>,
        channels: Vec<String>,
        dispatcher: Dispatcher,
        chat_log: Box<dyn ChatLog>,
    ) -> Self {
        Self {
            name: name.into(),
            credential: credential.into(),
            channels,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            dispatcher,
            chat_log,
        }
    }

    /// Bound on each wait for inbound data. Expiry is not an error; it only
    /// gives the loop a chance to notice termination.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Build a bot and its file-backed tables from configuration.
    pub fn from_config(config: &BotConfig, server: &ServerConfig) -> Result<Self, BotError> {
        let commands = CommandTable::open(Box::new(JsonFileStore::new(config.commands_path())))?;
        let moderation =
            ModerationTable::open(Box::new(JsonFileStore::new(config.prohibited_path())))?;
        info!(
            bot = %config.name,
            commands = commands.len(),
            prohibited = moderation.len(),
            "Loaded tables"
        );

        let dispatcher = Dispatcher::new(
            commands,
            moderation,
            RateLimiter::new(config.restriction_seconds),
            config.admins.iter().cloned(),
            config.moderator,
        );

        let chat_log: Box<dyn ChatLog> = if config.record.is_empty() {
            Box::new(NoOpLog)
        } else {
            Box::new(DailyFileLog::new(
                config.log_dir.clone(),
                config.record.iter().cloned(),
            ))
        };

        Ok(Self::new(
            config.name.clone(),
            config.oauth.clone(),
            config.channels.clone(),
            dispatcher,
            chat_log,
        )
        .with_idle_timeout(server.idle_timeout()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connect over TCP and run until terminated.
    pub async fn connect(self, address: &str) -> Result<(), BotError> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        info!(bot = %self.name, address, "Connected");
        self.run(stream).await
    }

    /// Register and run the read-dispatch-send loop on `stream`.
    ///
    /// Returns `Ok(())` once an admin whispers `!terminate`. Authentication
    /// failure and server disconnects end the loop with an error.
    #[instrument(skip_all, fields(bot = %self.name), name = "bot")]
    pub async fn run<S>(mut self, stream: S) -> Result<(), BotError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut framed = Framed::new(stream, LineCodec::new());

        let registration =
            Frame::registration(&self.name, &self.credential, self.channels.iter().map(String::as_str));
        for frame in registration {
            debug!(frame = ?frame, "Sending");
            framed.send(frame).await?;
        }
        info!(channels = ?self.channels, "Registered");

        let mut terminate = false;
        while !terminate {
            let line = match timeout(self.idle_timeout, framed.next()).await {
                Err(_) => {
                    trace!("Idle");
                    continue;
                }
                Ok(None) => {
                    info!("Server closed the connection");
                    return Err(BotError::ConnectionClosed);
                }
                Ok(Some(line)) => line?,
            };

            let effects = match classify(&line) {
                ParsedEvent::Ping { token } => {
                    trace!(token = %token, "PING");
                    framed.send(Frame::pong(token)).await?;
                    continue;
                }
                ParsedEvent::AuthFailure => {
                    error!("Login authentication failed");
                    return Err(BotError::AuthenticationFailed);
                }
                ParsedEvent::ChatMessage(msg) => self.on_chat(&msg).await,
                ParsedEvent::Whisper(whisper) => self.on_whisper(&whisper),
                ParsedEvent::ServerNotice { kind } => {
                    trace!(kind = %kind, "Server notice");
                    continue;
                }
                ParsedEvent::Unrecognized {
                    line,
                    reason: Some(reason),
                } => {
                    warn!(line = %line, error = %reason, "Malformed message");
                    continue;
                }
                ParsedEvent::Unrecognized { line, reason: None } => {
                    debug!(line = %line, "Unrecognized");
                    continue;
                }
            };

            for effect in effects {
                terminate |= self.apply(&mut framed, effect).await?;
            }
        }

        info!("Terminated");
        Ok(())
    }

    async fn on_chat(&mut self, msg: &ChatMessage) -> Vec<BotEffect> {
        info!(
            channel = %msg.channel,
            sender = %msg.sender,
            timestamp = %msg.timestamp,
            "{}",
            msg.text
        );
        let line = format_line(&msg.timestamp, &msg.sender, &msg.text);
        append_log(self.chat_log.as_ref(), &msg.channel, &line).await;
        self.dispatcher.handle_chat(msg)
    }

    fn on_whisper(&self, whisper: &Whisper) -> Vec<BotEffect> {
        info!(
            sender = %whisper.sender,
            timestamp = %whisper.timestamp,
            "Whisper: {}",
            whisper.text
        );
        self.dispatcher.handle_whisper(whisper)
    }

    /// Apply one effect; returns whether the loop should stop.
    async fn apply<S>(
        &mut self,
        framed: &mut Framed<S, LineCodec>,
        effect: BotEffect,
    ) -> Result<bool, BotError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match effect {
            BotEffect::Say { channel, text } => {
                framed.send(Frame::privmsg(channel.as_str(), text.as_str())).await?;
                self.dispatcher.record_send(Utc::now().timestamp());
                debug!(channel = %channel, text = %text, "Sent");
                if is_logged_reply(&text) {
                    let timestamp = Local::now().format("[%H:%M:%S]").to_string();
                    let line = format_line(&timestamp, &self.name, &text);
                    append_log(self.chat_log.as_ref(), &channel, &line).await;
                }
                Ok(false)
            }
            BotEffect::Whisper { user, text } => {
                framed.send(Frame::whisper(user.as_str(), text.as_str())).await?;
                info!(user = %user, "Whispered");
                Ok(false)
            }
            BotEffect::Terminate => Ok(true),
        }
    }
}

/// Slash directives are not chat, except `/me`.
fn is_logged_reply(text: &str) -> bool {
    !text.starts_with('/') || text.starts_with("/me")
}

async fn append_log(log: &dyn ChatLog, channel: &str, line: &str) {
    if !log.records(channel) {
        return;
    }
    if let Err(e) = log.append(channel, line).await {
        warn!(channel, error = %e, "Failed to append chat log");
    }
}
