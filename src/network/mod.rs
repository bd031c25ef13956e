//! Network module.
//!
//! Contains the per-bot connection loop.

mod bot;

pub use bot::Bot;
