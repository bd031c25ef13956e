//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one [[bot]] block is required")]
    NoBots,
    #[error("bot #{0}: name is required")]
    MissingName(usize),
    #[error("bot '{0}': oauth credential is required")]
    MissingCredential(String),
    #[error("bot '{0}': at least one channel is required")]
    NoChannels(String),
    #[error("bot '{0}' is declared more than once")]
    DuplicateBot(String),
    #[error("bot '{bot}': data_dir {dir:?} is already used by another bot")]
    SharedDataDir { bot: String, dir: String },
    #[error("server.address is required")]
    MissingAddress,
    #[error("server.idle_timeout_secs must be greater than zero")]
    ZeroIdleTimeout,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.address.trim().is_empty() {
        errors.push(ValidationError::MissingAddress);
    }
    if config.server.idle_timeout_secs == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    }

    if config.bots.is_empty() {
        errors.push(ValidationError::NoBots);
    }

    let mut seen = HashSet::new();
    let mut data_dirs = HashSet::new();
    for (idx, bot) in config.bots.iter().enumerate() {
        // Each bot owns its tables; a shared directory means shared files.
        if !data_dirs.insert(normalize_dir(&bot.data_dir)) {
            errors.push(ValidationError::SharedDataDir {
                bot: bot.name.clone(),
                dir: bot.data_dir.clone(),
            });
        }
        if bot.name.trim().is_empty() {
            errors.push(ValidationError::MissingName(idx));
            continue;
        }
        if !seen.insert(bot.name.to_lowercase()) {
            errors.push(ValidationError::DuplicateBot(bot.name.clone()));
        }
        if bot.oauth.trim().is_empty() {
            errors.push(ValidationError::MissingCredential(bot.name.clone()));
        }
        if bot.channels.iter().all(|c| c.is_empty()) {
            errors.push(ValidationError::NoChannels(bot.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `bot_files`, `bot_files/` and `./bot_files` name the same directory.
fn normalize_dir(dir: &str) -> PathBuf {
    Path::new(dir.trim())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
