use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use slime_arena_server::balance::{resolve_balance_config, ResolvedBalanceConfig};
use slime_arena_server::config::ServerConfig;
use slime_arena_server::game::room::Room;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    info!("Slime Arena Server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(max_rooms = config.max_rooms, "configuration loaded");

    let balance = Arc::new(load_balance(&config)?);
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, "match seed selected");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let room = Room::new(balance.clone(), seed);
    let mut rooms: HashMap<Uuid, tokio::task::JoinHandle<()>> = HashMap::new();
    rooms.insert(room.match_id(), tokio::spawn(room.run(shutdown_rx.clone())));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown_tx.send(true)?;

    for (id, handle) in rooms {
        if let Err(e) = handle.await {
            error!(room = %id, "room task failed: {e}");
        }
    }
    info!("Server stopped");
    Ok(())
}

fn load_balance(config: &ServerConfig) -> anyhow::Result<ResolvedBalanceConfig> {
    match &config.balance_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let resolved = resolve_balance_config(&value)?;
            info!(path, "balance config loaded");
            Ok(resolved)
        }
        None => {
            info!("no BALANCE_CONFIG_PATH set, using built-in balance defaults");
            Ok(ResolvedBalanceConfig::default())
        }
    }
}
