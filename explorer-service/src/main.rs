use std::net::SocketAddr;
use std::sync::Arc;

use ballot_indexer::VotingStateReader;
use cli::JsonRpcClient;
use explorer_service::{
    app,
    config::ServiceConfig,
    state::{AppState, SharedChain},
    watcher::{refresh_loop, tally_loop},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Ballot Explorer Service");

    let mut config = ServiceConfig::from_env()?;
    let client = JsonRpcClient::new(&config.rpc_url, config.contract)?;

    if config.deploy_block.is_none() {
        match client.deployment_block().await {
            Ok(block) => {
                info!("Contract deployed at block {}", block);
                config.deploy_block = Some(block);
            }
            Err(e) => warn!("Could not read deployment block, scanning without floor: {}", e),
        }
    }

    let chain: SharedChain = Arc::new(client);
    let state = AppState::new(chain, config.clone());

    tokio::spawn(refresh_loop(state.clone(), config.refresh_interval));
    tokio::spawn(tally_loop(state.clone(), config.tally_poll_interval));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
