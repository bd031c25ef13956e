//! Abuse controls applied by the dispatcher.
//!
//! - **Rate Limiting**: a single send window shared by every non-admin in
//!   the bot's channels

pub mod rate_limit;

pub use rate_limit::RateLimiter;
