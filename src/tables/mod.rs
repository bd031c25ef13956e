//! Persisted lookup tables owned by a bot.
//!
//! Both tables follow the same discipline: every mutation builds the next
//! document, hands it to the [`DocumentStore`](crate::store::DocumentStore),
//! and only then reloads the in-memory view from the store. A failed write
//! leaves the previous in-memory table untouched, and the in-memory table is
//! never ahead of what is durable.

pub mod commands;
pub mod moderation;

pub use commands::{
    AddOutcome, CommandAction, CommandEntry, CommandTable, DeleteOutcome, Permission,
};
pub use moderation::{DurationSpec, ModerationTable};
