use serde::Serialize;

use crate::state::{ActivityEvent, ActivityKind, ActivityRecord};
use crate::types::TxHash;

/// One row per distinct transaction, carrying its dominant activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub timestamp: Option<u64>,
    /// Number of indexed events emitted by this transaction
    pub event_count: usize,
    pub kind: ActivityKind,
    pub event: ActivityEvent,
}

impl TransactionView {
    pub fn from_record(record: &ActivityRecord) -> Self {
        Self {
            tx_hash: record.tx_hash,
            block_number: record.block_number,
            timestamp: record.timestamp,
            event_count: 1,
            kind: record.kind(),
            event: record.event.clone(),
        }
    }
}
