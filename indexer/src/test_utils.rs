//! In-memory ledger used by unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::ledger::{LedgerLogReader, LogEntry, VotingStateReader};
use crate::state::{ActivityEvent, ActivityKind, BlockSummary, VotingSummary};
use crate::types::{Address, BlockHash, TxHash};

pub fn hash(byte: u8) -> TxHash {
    TxHash::repeat_byte(byte)
}

pub fn created_log(block: u64, hash_byte: u8, voting_id: u64) -> LogEntry {
    LogEntry {
        block_number: Some(block),
        tx_hash: Some(hash(hash_byte)),
        log_index: Some(0),
        event: ActivityEvent::Created {
            voting_id,
            creator: Address::repeat_byte(0xc0),
            title: format!("Voting {}", voting_id),
            end_time: 2_000_000_000,
            option_count: 3,
        },
    }
}

pub fn vote_log(block: u64, hash_byte: u8, voting_id: u64, option_index: u64) -> LogEntry {
    LogEntry {
        block_number: Some(block),
        tx_hash: Some(hash(hash_byte)),
        log_index: Some(1),
        event: ActivityEvent::VoteCast {
            voting_id,
            voter: Address::repeat_byte(0xd0),
            option_index,
        },
    }
}

pub fn block_timestamp(number: u64) -> u64 {
    1_700_000_000 + number * 12
}

#[derive(Default)]
pub struct FakeLedger {
    pub head: Mutex<u64>,
    pub head_failure: Mutex<Option<LedgerError>>,
    pub logs: Mutex<Vec<LogEntry>>,
    pub log_failures: Mutex<HashMap<ActivityKind, LedgerError>>,
    pub failing_blocks: Mutex<HashSet<u64>>,
    pub block_requests: Mutex<Vec<u64>>,
    pub votings: Mutex<Vec<(VotingSummary, Vec<String>)>>,
    pub votes: Mutex<HashMap<(u64, u64), u128>>,
    pub failing_votes: Mutex<HashSet<(u64, u64)>>,
    pub voters: Mutex<HashSet<(u64, Address)>>,
    pub owner: Mutex<Address>,
}

impl FakeLedger {
    pub fn with_head(head: u64) -> Self {
        let ledger = Self::default();
        *ledger.head.lock().unwrap() = head;
        ledger
    }

    pub fn push_log(&self, entry: LogEntry) {
        self.logs.lock().unwrap().push(entry);
    }

    pub fn fail_logs(&self, kind: ActivityKind, error: LedgerError) {
        self.log_failures.lock().unwrap().insert(kind, error);
    }

    pub fn fail_block(&self, number: u64) {
        self.failing_blocks.lock().unwrap().insert(number);
    }

    pub fn add_voting(&self, summary: VotingSummary, options: &[&str]) {
        let options = options.iter().map(|s| s.to_string()).collect();
        self.votings.lock().unwrap().push((summary, options));
    }

    pub fn set_votes(&self, voting_id: u64, option_index: u64, count: u128) {
        self.votes
            .lock()
            .unwrap()
            .insert((voting_id, option_index), count);
    }

    pub fn requested_blocks(&self) -> Vec<u64> {
        self.block_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerLogReader for FakeLedger {
    async fn get_logs(
        &self,
        _address: &Address,
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        if let Some(err) = self.log_failures.lock().unwrap().get(&kind) {
            return Err(err.clone());
        }
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.event.kind() == kind)
            .filter(|entry| match entry.block_number {
                Some(n) => n >= from_block && n <= to_block,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        if let Some(err) = self.head_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(*self.head.lock().unwrap())
    }

    async fn block(&self, number: u64) -> Result<BlockSummary, LedgerError> {
        self.block_requests.lock().unwrap().push(number);
        if self.failing_blocks.lock().unwrap().contains(&number) {
            return Err(LedgerError::Transport(format!("block {} unavailable", number)));
        }
        Ok(BlockSummary {
            number,
            hash: BlockHash::repeat_byte((number % 256) as u8),
            timestamp: block_timestamp(number),
            miner: Address::repeat_byte(0x11),
            tx_count: number % 7,
            base_fee: Some(1_000_000_000),
        })
    }
}

#[async_trait]
impl VotingStateReader for FakeLedger {
    async fn voting_count(&self) -> Result<u64, LedgerError> {
        Ok(self.votings.lock().unwrap().len() as u64)
    }

    async fn voting(&self, id: u64) -> Result<VotingSummary, LedgerError> {
        self.votings
            .lock()
            .unwrap()
            .get(id as usize)
            .map(|(summary, _)| summary.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("voting {}", id)))
    }

    async fn options(&self, id: u64) -> Result<Vec<String>, LedgerError> {
        self.votings
            .lock()
            .unwrap()
            .get(id as usize)
            .map(|(_, options)| options.clone())
            .ok_or_else(|| LedgerError::NotFound(format!("voting {}", id)))
    }

    async fn has_voted(&self, id: u64, voter: &Address) -> Result<bool, LedgerError> {
        Ok(self.voters.lock().unwrap().contains(&(id, *voter)))
    }

    async fn vote_count(&self, id: u64, option_index: u64) -> Result<u128, LedgerError> {
        if self
            .failing_votes
            .lock()
            .unwrap()
            .contains(&(id, option_index))
        {
            return Err(LedgerError::Transport("vote count unavailable".to_string()));
        }
        Ok(self
            .votes
            .lock()
            .unwrap()
            .get(&(id, option_index))
            .copied()
            .unwrap_or(0))
    }

    async fn deployment_block(&self) -> Result<u64, LedgerError> {
        Ok(0)
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        Ok(*self.owner.lock().unwrap())
    }
}
