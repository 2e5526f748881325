//! Runs the refresh pipeline and owns the current activity snapshot

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::IndexerConfig;
use crate::countdown::unix_now;
use crate::enricher::{enrich_timestamps, fetch_recent_blocks, EnrichmentReport};
use crate::error::IndexingError;
use crate::ledger::LedgerLogReader;
use crate::merger::{fetch_activity, truncate};
use crate::range_clock::{compute_window, BlockWindow};
use crate::store::ActivityStore;
use crate::types::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub window: BlockWindow,
    /// Records after merging, before truncation
    pub fetched: usize,
    pub kept: usize,
    pub enriched_blocks: usize,
    pub enrichment_gaps: Vec<u64>,
    pub recent_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed(RefreshSummary),
    /// Another refresh was already running; nothing was fetched
    Skipped,
}

/// Clears the in-flight flag when the refresh finishes or its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Activity explorer for one contract.
///
/// Readers get a cheap `Arc` of the current store. A refresh builds a complete new store and swaps
/// it in; a failed refresh leaves the previous one untouched.
pub struct Explorer<L> {
    ledger: L,
    contract: Address,
    config: IndexerConfig,
    store: RwLock<Arc<ActivityStore>>,
    in_flight: AtomicBool,
}

impl<L: LedgerLogReader> Explorer<L> {
    pub fn new(ledger: L, contract: Address, config: IndexerConfig) -> Self {
        Self {
            ledger,
            contract,
            config,
            store: RwLock::new(Arc::new(ActivityStore::default())),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<ActivityStore> {
        self.store
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, IndexingError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        let latest = self
            .ledger
            .block_number()
            .await
            .map_err(IndexingError::LatestBlock)?;
        let window = compute_window(latest, self.config.window_blocks, self.config.floor_block);
        info!(
            "Refreshing activity for {} over blocks {}..={}",
            self.contract, window.from_block, window.to_block
        );

        let merged = fetch_activity(&self.ledger, &self.contract, window).await?;
        let fetched = merged.len();
        let mut records = truncate(merged, self.config.max_display);

        let EnrichmentReport { resolved, gaps } = enrich_timestamps(&self.ledger, &mut records).await;
        if !gaps.is_empty() {
            warn!("{} blocks left without timestamps", gaps.len());
        }
        let blocks = fetch_recent_blocks(&self.ledger, latest, self.config.recent_blocks).await;

        let summary = RefreshSummary {
            window,
            fetched,
            kept: records.len(),
            enriched_blocks: resolved,
            enrichment_gaps: gaps,
            recent_blocks: blocks.len(),
        };
        let store = Arc::new(ActivityStore::new(records, blocks, window, unix_now()));
        *self
            .store
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = store;

        info!(
            "Refresh complete: kept {} of {} events, {} recent blocks",
            summary.kept, summary.fetched, summary.recent_blocks
        );
        Ok(RefreshOutcome::Refreshed(summary))
    }
}
