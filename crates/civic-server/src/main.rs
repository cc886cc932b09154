//! API server entry point for the Civic city-management game.
//!
//! Loads `civic-config.yaml` (or the file named by `CIVIC_CONFIG`),
//! initializes logging, builds the game session and the advisor, then
//! serves the HTTP API until `Ctrl-C`.

use std::path::PathBuf;
use std::sync::Arc;

use civic_advisor::Advisor;
use civic_core::GameSession;
use civic_core::config::{GameConfig, LogFormat, LoggingConfig};
use civic_server::{AppState, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "civic-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration or game content is invalid, or
/// the server cannot bind.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, loaded_from) = load_config()?;
    init_tracing(&config.logging);

    match &loaded_from {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => warn!("no configuration file found, using built-in defaults"),
    }

    let seed = config.game.seed.unwrap_or_else(rand::random);
    let session = GameSession::from_config(&config, seed)?;
    let advisor = Advisor::new(&config.advisor)?;
    info!(
        session_id = %session.id(),
        seed,
        max_turns = config.game.max_turns,
        remote_advisor = advisor.has_remote(),
        "game session ready"
    );

    let state = Arc::new(AppState::new(session, advisor));
    start_server(&config.server, state).await?;

    Ok(())
}

/// Read the configuration file, falling back to defaults when it is absent.
///
/// Returns the path actually read, if any.
fn load_config() -> anyhow::Result<(GameConfig, Option<PathBuf>)> {
    let path = std::env::var_os("CIVIC_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if !path.exists() {
        let mut config = GameConfig::default();
        config.advisor.apply_env_overrides();
        return Ok((config, None));
    }

    let config = GameConfig::from_file(&path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    Ok((config, Some(path)))
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
