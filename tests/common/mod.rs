//! Integration test common infrastructure.
//!
//! Provides a fake chat server for the bot to connect to and a handle on
//! the real `maestro` binary running against it.

pub mod bot;
pub mod server;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use server::{ChatServer, ChatSession};
