//! Service configuration read from the environment

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ballot_indexer::{
    catalog::DEFAULT_VISIBLE,
    config::{DEFAULT_MAX_DISPLAY, DEFAULT_RECENT_BLOCKS, DEFAULT_WINDOW_BLOCKS},
    Address, IndexerConfig,
};
use cli::consts::DEFAULT_RPC_URL;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_TALLY_POLL_INTERVAL_SECS: u64 = 4;
pub const DEFAULT_TALLY_IDLE_SECS: u64 = 60;

/// Parse an environment variable into a type implementing FromStr, with a default fallback
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub rpc_url: String,
    pub contract: Address,
    pub port: u16,
    /// Overrides the deployment block read from the contract
    pub deploy_block: Option<u64>,
    pub indexer: IndexerConfig,
    pub refresh_interval: Duration,
    pub tally_poll_interval: Duration,
    /// A mounted tally nobody has viewed for this long is unmounted
    pub tally_idle: Duration,
    pub visible_votings: usize,
    pub explorer_url: Option<String>,
    pub metrics_auth_token: Option<String>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let contract = std::env::var("CONTRACT_ADDRESS")
            .map_err(|_| anyhow!("CONTRACT_ADDRESS must be set"))?;
        let contract = Address::from_str(contract.trim())
            .map_err(|e| anyhow!("invalid CONTRACT_ADDRESS: {}", e))?;

        let indexer = IndexerConfig {
            window_blocks: env_parse("LOG_WINDOW_BLOCKS", DEFAULT_WINDOW_BLOCKS),
            max_display: env_parse("MAX_DISPLAY_EVENTS", DEFAULT_MAX_DISPLAY),
            recent_blocks: env_parse("RECENT_BLOCKS", DEFAULT_RECENT_BLOCKS),
            ..IndexerConfig::default()
        };

        Ok(Self {
            rpc_url: env_parse("RPC_URL", DEFAULT_RPC_URL.to_string()),
            contract,
            port: env_parse("PORT", DEFAULT_PORT),
            deploy_block: env_opt("DEPLOY_BLOCK"),
            indexer,
            refresh_interval: Duration::from_secs(
                env_parse("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS).max(1),
            ),
            tally_poll_interval: Duration::from_secs(
                env_parse("TALLY_POLL_INTERVAL_SECS", DEFAULT_TALLY_POLL_INTERVAL_SECS).max(1),
            ),
            tally_idle: Duration::from_secs(env_parse("TALLY_IDLE_SECS", DEFAULT_TALLY_IDLE_SECS)),
            visible_votings: env_parse("VISIBLE_VOTINGS", DEFAULT_VISIBLE),
            explorer_url: env_opt("EXPLORER_URL"),
            metrics_auth_token: env_opt("METRICS_AUTH_TOKEN"),
        })
    }

    /// Configuration for an in-process router; nothing is read from the environment.
    pub fn for_contract(contract: Address) -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract,
            port: DEFAULT_PORT,
            deploy_block: None,
            indexer: IndexerConfig::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            tally_poll_interval: Duration::from_secs(DEFAULT_TALLY_POLL_INTERVAL_SECS),
            tally_idle: Duration::from_secs(DEFAULT_TALLY_IDLE_SECS),
            visible_votings: DEFAULT_VISIBLE,
            explorer_url: None,
            metrics_auth_token: None,
        }
    }
}
