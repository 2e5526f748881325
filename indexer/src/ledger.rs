//! Narrow interfaces to the remote ledger and the voting contract

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LedgerError, WriteError};
use crate::intent::{CastVoteIntent, CreateVotingIntent};
use crate::state::{ActivityEvent, ActivityKind, BlockSummary, VotingSummary};
use crate::types::{Address, TxHash};

/// A decoded contract log. Pending logs may lack their position fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub block_number: Option<u64>,
    pub tx_hash: Option<TxHash>,
    pub log_index: Option<u64>,
    pub event: ActivityEvent,
}

#[async_trait]
pub trait LedgerLogReader: Send + Sync {
    /// Logs of one event kind emitted by `address` within `from_block..=to_block`.
    async fn get_logs(
        &self,
        address: &Address,
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, LedgerError>;

    async fn block_number(&self) -> Result<u64, LedgerError>;

    async fn block(&self, number: u64) -> Result<BlockSummary, LedgerError>;
}

#[async_trait]
pub trait VotingStateReader: Send + Sync {
    async fn voting_count(&self) -> Result<u64, LedgerError>;

    async fn voting(&self, id: u64) -> Result<VotingSummary, LedgerError>;

    async fn options(&self, id: u64) -> Result<Vec<String>, LedgerError>;

    async fn has_voted(&self, id: u64, voter: &Address) -> Result<bool, LedgerError>;

    async fn vote_count(&self, id: u64, option_index: u64) -> Result<u128, LedgerError>;

    /// Block at which the contract was deployed, used as the scan floor
    async fn deployment_block(&self) -> Result<u64, LedgerError>;

    /// Administrator account, the only one allowed to create votings
    async fn owner(&self) -> Result<Address, LedgerError>;
}

#[async_trait]
pub trait WriteSubmitter: Send + Sync {
    async fn create_voting(&self, intent: &CreateVotingIntent) -> Result<TxHash, WriteError>;

    async fn cast_vote(&self, intent: &CastVoteIntent) -> Result<TxHash, WriteError>;
}

#[async_trait]
impl<T: LedgerLogReader + ?Sized> LedgerLogReader for Arc<T> {
    async fn get_logs(
        &self,
        address: &Address,
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        (**self).get_logs(address, kind, from_block, to_block).await
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        (**self).block_number().await
    }

    async fn block(&self, number: u64) -> Result<BlockSummary, LedgerError> {
        (**self).block(number).await
    }
}

#[async_trait]
impl<T: VotingStateReader + ?Sized> VotingStateReader for Arc<T> {
    async fn voting_count(&self) -> Result<u64, LedgerError> {
        (**self).voting_count().await
    }

    async fn voting(&self, id: u64) -> Result<VotingSummary, LedgerError> {
        (**self).voting(id).await
    }

    async fn options(&self, id: u64) -> Result<Vec<String>, LedgerError> {
        (**self).options(id).await
    }

    async fn has_voted(&self, id: u64, voter: &Address) -> Result<bool, LedgerError> {
        (**self).has_voted(id, voter).await
    }

    async fn vote_count(&self, id: u64, option_index: u64) -> Result<u128, LedgerError> {
        (**self).vote_count(id, option_index).await
    }

    async fn deployment_block(&self) -> Result<u64, LedgerError> {
        (**self).deployment_block().await
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        (**self).owner().await
    }
}

#[async_trait]
impl<T: WriteSubmitter + ?Sized> WriteSubmitter for Arc<T> {
    async fn create_voting(&self, intent: &CreateVotingIntent) -> Result<TxHash, WriteError> {
        (**self).create_voting(intent).await
    }

    async fn cast_vote(&self, intent: &CastVoteIntent) -> Result<TxHash, WriteError> {
        (**self).cast_vote(intent).await
    }
}
