//! maestro - a chat bot for Twitch-style IRC servers.
//!
//! Runs one connection per configured `[[bot]]`, each with its own command
//! table, moderation table, rate limiter, and chat log.

mod config;
mod error;
mod handlers;
mod history;
mod network;
mod security;
mod store;
mod tables;

use crate::config::{Config, validate};
use crate::network::Bot;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "maestro.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {config_path}",
            errors.len()
        ));
    }

    info!(
        address = %config.server.address,
        bots = config.bots.len(),
        "Starting maestro"
    );

    // Build every bot before connecting any, so a broken data file stops
    // startup instead of leaving some bots running.
    let mut bots = Vec::with_capacity(config.bots.len());
    for bot_config in &config.bots {
        let bot = Bot::from_config(bot_config, &config.server).map_err(|e| {
            error!(bot = %bot_config.name, error = %e, "Failed to load bot tables");
            e
        })?;
        bots.push(bot);
    }

    let mut set = JoinSet::new();
    for bot in bots {
        let address = config.server.address.clone();
        set.spawn(async move {
            let name = bot.name().to_owned();
            (name, bot.connect(&address).await)
        });
    }

    loop {
        tokio::select! {
            joined = set.join_next() => {
                let Some(joined) = joined else {
                    break;
                };
                match joined {
                    Ok((name, Ok(()))) => info!(bot = %name, "Bot stopped"),
                    Ok((name, Err(e))) if e.is_fatal() => {
                        error!(bot = %name, error = %e, "Fatal error, shutting down");
                        set.abort_all();
                        return Err(anyhow::anyhow!("bot {name}: {e}"));
                    }
                    Ok((name, Err(e))) => error!(bot = %name, error = %e, "Bot exited with error"),
                    Err(e) => error!(error = %e, "Bot task failed"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("Shutting down");
                set.abort_all();
                break;
            }
        }
    }

    info!("All bots stopped");
    Ok(())
}
