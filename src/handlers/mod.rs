//! Inbound event handling.
//!
//! The [`Dispatcher`] turns a parsed chat message or whisper into a list of
//! [`BotEffect`]s. It owns the command table, the moderation table and the
//! rate limiter; the connection loop applies the effects (sends, logging,
//! termination) and reports sends back through [`Dispatcher::record_send`].
//!
//! ## Pipeline
//!
//! ```text
//! ChatMessage ─┬─► rate limiter ─► command table ─► action / local command
//!              └─► moderation table (bot is moderator) ─► timeout + notice
//! Whisper ─────────► admin control (!psst, !terminate)
//! ```

pub mod actions;
mod dispatch;
mod effect;
mod local;

pub use dispatch::Dispatcher;
pub use effect::BotEffect;
