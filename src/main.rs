//! lurkbot - a channel-lurking IRC responder bot.
//!
//! Maintains one persistent session per configured server and answers chat
//! lines through a set of pluggable listeners.

mod config;
mod error;
mod listeners;
mod net;
mod session;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::listeners::fact::FactListener;
use crate::listeners::restart::RestartListener;
use crate::listeners::weather::WeatherListener;
use crate::listeners::ListenerSet;
use crate::session::Session;

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
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if config.connections.is_empty() {
        anyhow::bail!("no [[connections]] configured in {}", config_path);
    }

    let mut set = ListenerSet::new();
    set.register(Arc::new(RestartListener));
    if let Some(weather) = config.weather.clone() {
        set.register(Arc::new(WeatherListener::new(weather)));
    }
    if let Some(facts) = config.facts.clone() {
        set.register(Arc::new(FactListener::new(facts.path)));
    }
    let listeners = Arc::new(set);

    info!(
        connections = config.connections.len(),
        listeners = listeners.len(),
        "Starting lurkbot"
    );

    let mut sessions = tokio::task::JoinSet::new();
    for connection in config.connections {
        let session = Session::new(connection, config.timing.clone(), Arc::clone(&listeners));
        sessions.spawn(session.run());
    }

    // Sessions run forever; reaching here means one panicked.
    while let Some(result) = sessions.join_next().await {
        if let Err(e) = result {
            error!(error = %e, "session task ended unexpectedly");
        }
    }

    Ok(())
}
