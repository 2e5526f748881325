//! Shared application state and tally mounting

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ballot_indexer::{
    card::{load_card, VotingCard},
    tally::{TallyAggregator, TallyBoard, TallyHandle},
    Address, Explorer, LedgerError, LedgerLogReader, VotingStateReader,
};

use crate::config::ServiceConfig;

/// A ledger able to serve both activity logs and voting state.
pub trait ChainReader: LedgerLogReader + VotingStateReader {}

impl<T: LedgerLogReader + VotingStateReader + ?Sized> ChainReader for T {}

pub type SharedChain = Arc<dyn ChainReader>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<Explorer<SharedChain>>,
    pub tallies: Arc<Mutex<TallyBoard>>,
    /// Unix time each mounted tally was last shown on a card
    last_viewed: Arc<Mutex<HashMap<TallyHandle, u64>>>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(chain: SharedChain, config: ServiceConfig) -> Self {
        let indexer = config.indexer.clone().with_floor_block(config.deploy_block);
        Self {
            explorer: Arc::new(Explorer::new(chain, config.contract, indexer)),
            tallies: Arc::new(Mutex::new(TallyBoard::new())),
            last_viewed: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub fn chain(&self) -> &SharedChain {
        self.explorer.ledger()
    }

    pub fn board(&self) -> MutexGuard<'_, TallyBoard> {
        self.tallies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn viewed(&self) -> MutexGuard<'_, HashMap<TallyHandle, u64>> {
        self.last_viewed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether the tally behind `handle` has gone unviewed for longer than the idle limit.
    pub fn is_idle(&self, handle: TallyHandle, now: u64) -> bool {
        match self.viewed().get(&handle) {
            Some(&seen) => now.saturating_sub(seen) > self.config.tally_idle.as_secs(),
            None => false,
        }
    }

    pub fn unmount(&self, handle: TallyHandle) -> Option<TallyAggregator> {
        self.viewed().remove(&handle);
        self.board().unmount(handle)
    }

    /// Load a card for `voting_id`, mounting its tally on first use.
    ///
    /// Every load counts as a view and keeps the tally mounted for another idle period.
    /// The board lock is only held to copy the tally out and to write it back, never across a
    /// ledger read. A tally unmounted while the read was in flight is not resurrected.
    pub async fn card(
        &self,
        voting_id: u64,
        viewer: Option<&Address>,
        now: u64,
    ) -> Result<VotingCard, LedgerError> {
        let (handle, mut tally) = self.checkout(voting_id).await?;
        self.viewed().insert(handle, now);
        let card = load_card(self.chain(), voting_id, viewer, &mut tally, now).await?;
        self.check_in(handle, tally);
        Ok(card)
    }

    async fn checkout(&self, voting_id: u64) -> Result<(TallyHandle, TallyAggregator), LedgerError> {
        {
            let board = self.board();
            if let Some(handle) = board.find(voting_id) {
                if let Some(tally) = board.get(handle) {
                    return Ok((handle, tally.clone()));
                }
            }
        }
        let summary = self.chain().voting(voting_id).await?;
        let mut board = self.board();
        let handle = match board.find(voting_id) {
            Some(handle) => handle,
            None => board.mount(&summary),
        };
        let tally = board
            .get(handle)
            .cloned()
            .unwrap_or_else(|| TallyAggregator::new(summary.id, summary.option_count));
        Ok((handle, tally))
    }

    pub fn check_in(&self, handle: TallyHandle, tally: TallyAggregator) {
        if let Some(slot) = self.board().get_mut(handle) {
            *slot = tally;
        }
    }
}
