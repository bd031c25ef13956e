//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_address() -> String {
    "irc.chat.twitch.tv:6667".to_string()
}

/// Upper bound on a single readiness wait, so a terminate request is
/// noticed even when the channel is silent.
pub fn default_idle_timeout() -> u64 {
    120
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_data_dir() -> String {
    "bot_files".to_string()
}

pub fn default_log_dir() -> String {
    "local_logs".to_string()
}
