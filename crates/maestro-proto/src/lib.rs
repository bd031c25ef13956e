//! # maestro-proto
//!
//! Wire-level support for the Twitch flavour of IRC chat.
//!
//! ## Features
//!
//! - Newline framing for tokio streams ([`LineCodec`])
//! - Classification of raw inbound lines into typed events ([`classify`])
//! - Typed outbound frames with their wire serialization ([`Frame`])
//!
//! ## Quick Start
//!
//! ```rust
//! use maestro_proto::{classify, ParsedEvent};
//!
//! let raw = ":user1!user1@user1.tmi.twitch.tv PRIVMSG #mychan :hello there";
//! match classify(raw) {
//!     ParsedEvent::ChatMessage(msg) => {
//!         assert_eq!(msg.channel, "mychan");
//!         assert_eq!(msg.sender, "user1");
//!         assert_eq!(msg.text, "hello there");
//!     }
//!     other => panic!("unexpected event: {other:?}"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod frame;
#[cfg(feature = "tokio")]
pub mod line;

pub use self::error::{ParseError, ProtocolError};
pub use self::event::{classify, classify_at, ChatMessage, ParsedEvent, Whisper, SERVER_NOISE};
pub use self::frame::Frame;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;

/// Maximum accepted inbound line length: 8191 bytes of IRCv3 tags plus a 512 byte body.
pub const MAX_LINE_LEN: usize = 8191 + 512;
