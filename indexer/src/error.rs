use thiserror::Error;

use crate::state::ActivityKind;
use crate::types::{Address, TxHash};

/// Failure reported by a remote ledger collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// A refresh could not fetch what it needs. The prior store stays in place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexingError {
    #[error("failed to read latest block: {0}")]
    LatestBlock(LedgerError),
    #[error("failed to fetch {kind} logs in blocks {from_block}..={to_block}: {cause}")]
    Logs {
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
        cause: LedgerError,
    },
}

impl IndexingError {
    pub fn cause(&self) -> &LedgerError {
        match self {
            IndexingError::LatestBlock(cause) => cause,
            IndexingError::Logs { cause, .. } => cause,
        }
    }
}

/// A write intent failed validation before reaching the submitter
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title exceeds {max} characters")]
    TitleTooLong { max: usize },
    #[error("at least {min} distinct options are required")]
    TooFewOptions { min: usize },
    #[error("too many options, at most {max} allowed")]
    TooManyOptions { max: usize },
    #[error("duplicate option: {0}")]
    DuplicateOption(String),
    #[error("duration must be positive")]
    InvalidDuration,
    #[error("voting {0} is not active")]
    VotingClosed(u64),
    #[error("option {option_index} is out of range for voting {voting_id}")]
    OptionOutOfRange { voting_id: u64, option_index: u64 },
    #[error("already voted in voting {0}")]
    AlreadyVoted(u64),
    #[error("{0} is not the contract owner")]
    NotOwner(Address),
}

/// A write transaction could not be submitted or did not succeed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WriteError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("transaction rejected: {0}")]
    Rejected(String),
}
