//! In-memory chain hosting one voting contract

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use ballot_indexer::{
    countdown::unix_now,
    intent::{CastVoteIntent, CreateVotingIntent},
    ActivityEvent, ActivityKind, Address, BlockSummary, LedgerError, LedgerLogReader, LogEntry,
    TxHash, VotingStateReader, VotingSummary, WriteError, WriteSubmitter,
};

use super::fixtures::{block_hash, block_timestamp, tx_hash};

struct StoredVoting {
    summary: VotingSummary,
    options: Vec<String>,
    votes: Vec<u128>,
    voters: HashSet<Address>,
}

#[derive(Default)]
struct ChainState {
    head: u64,
    deploy_block: u64,
    head_down: bool,
    logs: Vec<LogEntry>,
    failing_kinds: HashSet<ActivityKind>,
    failing_blocks: HashSet<u64>,
    block_requests: Vec<u64>,
    failing_counts: HashSet<(u64, u64)>,
    count_reads: usize,
    votings: Vec<StoredVoting>,
    next_tx: u64,
    owner: Address,
}

/// Fake ledger whose writes mine one block each and emit the matching contract log.
/// The account given to [`FakeChain::new`] deploys, and therefore owns, the contract.
#[derive(Default)]
pub struct FakeChain {
    state: Mutex<ChainState>,
    /// Account that signs writes
    pub sender: Address,
}

impl FakeChain {
    pub fn new(head: u64, sender: Address) -> Self {
        let chain = Self {
            state: Mutex::new(ChainState::default()),
            sender,
        };
        {
            let mut state = chain.lock();
            state.head = head;
            state.deploy_block = head;
            state.owner = sender;
        }
        chain
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn head(&self) -> u64 {
        self.lock().head
    }

    pub fn set_owner(&self, owner: Address) {
        self.lock().owner = owner;
    }

    pub fn mine(&self, blocks: u64) {
        self.lock().head += blocks;
    }

    pub fn push_log(&self, log: LogEntry) {
        self.lock().logs.push(log);
    }

    pub fn set_head_down(&self, down: bool) {
        self.lock().head_down = down;
    }

    pub fn fail_logs(&self, kind: ActivityKind) {
        self.lock().failing_kinds.insert(kind);
    }

    pub fn fail_block(&self, number: u64) {
        self.lock().failing_blocks.insert(number);
    }

    pub fn fail_count(&self, voting_id: u64, option_index: u64) {
        self.lock().failing_counts.insert((voting_id, option_index));
    }

    pub fn heal(&self) {
        let mut state = self.lock();
        state.head_down = false;
        state.failing_kinds.clear();
        state.failing_blocks.clear();
        state.failing_counts.clear();
    }

    pub fn block_requests(&self) -> Vec<u64> {
        self.lock().block_requests.clone()
    }

    pub fn count_reads(&self) -> usize {
        self.lock().count_reads
    }

    pub fn close(&self, voting_id: u64) {
        if let Some(voting) = self.lock().votings.get_mut(voting_id as usize) {
            voting.summary.is_active = false;
        }
    }

    /// Create a voting as `creator`, mined in a new block.
    pub fn add_voting(&self, creator: Address, title: &str, options: &[&str], duration_secs: u64) -> u64 {
        let mut state = self.lock();
        state.head += 1;
        state.next_tx += 1;
        let id = state.votings.len() as u64;
        let summary = VotingSummary {
            id,
            title: title.to_string(),
            creator,
            end_time: unix_now() + duration_secs,
            option_count: options.len() as u64,
            is_active: true,
        };
        let log = LogEntry {
            block_number: Some(state.head),
            tx_hash: Some(tx_hash(state.next_tx)),
            log_index: Some(0),
            event: ActivityEvent::Created {
                voting_id: id,
                creator,
                title: summary.title.clone(),
                end_time: summary.end_time,
                option_count: summary.option_count,
            },
        };
        state.logs.push(log);
        state.votings.push(StoredVoting {
            summary,
            options: options.iter().map(|o| o.to_string()).collect(),
            votes: vec![0; options.len()],
            voters: HashSet::new(),
        });
        id
    }

    /// Record a vote from `voter`, mined in a new block.
    pub fn cast(&self, voter: Address, voting_id: u64, option_index: u64) -> Result<TxHash, WriteError> {
        let mut state = self.lock();
        let head = state.head + 1;
        let tx = tx_hash(state.next_tx + 1);
        let voting = state
            .votings
            .get_mut(voting_id as usize)
            .ok_or_else(|| WriteError::Rejected(format!("voting {} does not exist", voting_id)))?;
        if !voting.summary.is_active || unix_now() >= voting.summary.end_time {
            return Err(WriteError::Rejected("voting is closed".to_string()));
        }
        if !voting.voters.insert(voter) {
            return Err(WriteError::Rejected("already voted".to_string()));
        }
        let slot = voting
            .votes
            .get_mut(option_index as usize)
            .ok_or_else(|| WriteError::Rejected("invalid option".to_string()))?;
        *slot += 1;

        state.head = head;
        state.next_tx += 1;
        state.logs.push(LogEntry {
            block_number: Some(head),
            tx_hash: Some(tx),
            log_index: Some(0),
            event: ActivityEvent::VoteCast {
                voting_id,
                voter,
                option_index,
            },
        });
        Ok(tx)
    }

    fn stored<T>(&self, id: u64, f: impl FnOnce(&StoredVoting) -> T) -> Result<T, LedgerError> {
        self.lock()
            .votings
            .get(id as usize)
            .map(f)
            .ok_or_else(|| LedgerError::NotFound(format!("voting {}", id)))
    }
}

#[async_trait]
impl LedgerLogReader for FakeChain {
    async fn get_logs(
        &self,
        _address: &Address,
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        let state = self.lock();
        if state.failing_kinds.contains(&kind) {
            return Err(LedgerError::Rpc {
                code: -32005,
                message: "query timeout exceeded".to_string(),
            });
        }
        Ok(state
            .logs
            .iter()
            .filter(|log| log.event.kind() == kind)
            .filter(|log| match log.block_number {
                Some(block) => (from_block..=to_block).contains(&block),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        let state = self.lock();
        if state.head_down {
            return Err(LedgerError::Transport("connection refused".to_string()));
        }
        Ok(state.head)
    }

    async fn block(&self, number: u64) -> Result<BlockSummary, LedgerError> {
        let mut state = self.lock();
        state.block_requests.push(number);
        if state.failing_blocks.contains(&number) {
            return Err(LedgerError::Transport(format!("block {} unavailable", number)));
        }
        if number > state.head {
            return Err(LedgerError::NotFound(format!("block {}", number)));
        }
        let tx_count = state
            .logs
            .iter()
            .filter(|log| log.block_number == Some(number))
            .count() as u64;
        Ok(BlockSummary {
            number,
            hash: block_hash(number),
            timestamp: block_timestamp(number),
            miner: Address::repeat_byte(0x11),
            tx_count,
            base_fee: Some(1_000_000_000),
        })
    }
}

#[async_trait]
impl VotingStateReader for FakeChain {
    async fn voting_count(&self) -> Result<u64, LedgerError> {
        Ok(self.lock().votings.len() as u64)
    }

    async fn voting(&self, id: u64) -> Result<VotingSummary, LedgerError> {
        self.stored(id, |v| v.summary.clone())
    }

    async fn options(&self, id: u64) -> Result<Vec<String>, LedgerError> {
        self.stored(id, |v| v.options.clone())
    }

    async fn has_voted(&self, id: u64, voter: &Address) -> Result<bool, LedgerError> {
        self.stored(id, |v| v.voters.contains(voter))
    }

    async fn vote_count(&self, id: u64, option_index: u64) -> Result<u128, LedgerError> {
        {
            let mut state = self.lock();
            state.count_reads += 1;
            if state.failing_counts.contains(&(id, option_index)) {
                return Err(LedgerError::Transport("read timed out".to_string()));
            }
        }
        self.stored(id, |v| v.votes.get(option_index as usize).copied())?
            .ok_or_else(|| LedgerError::NotFound(format!("option {} of voting {}", option_index, id)))
    }

    async fn deployment_block(&self) -> Result<u64, LedgerError> {
        Ok(self.lock().deploy_block)
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        Ok(self.lock().owner)
    }
}

#[async_trait]
impl WriteSubmitter for FakeChain {
    async fn create_voting(&self, intent: &CreateVotingIntent) -> Result<TxHash, WriteError> {
        let options: Vec<&str> = intent.options.iter().map(String::as_str).collect();
        let id = self.add_voting(self.sender, &intent.title, &options, intent.duration_secs);
        let state = self.lock();
        state
            .logs
            .iter()
            .rev()
            .find(|log| log.event.kind() == ActivityKind::Created && log.event.voting_id() == id)
            .and_then(|log| log.tx_hash)
            .ok_or_else(|| WriteError::Rejected("creation log missing".to_string()))
    }

    async fn cast_vote(&self, intent: &CastVoteIntent) -> Result<TxHash, WriteError> {
        self.cast(self.sender, intent.voting_id, intent.option_index)
    }
}
