//! Fetches both event kinds over a block window and merges them into one ordered feed

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::IndexingError;
use crate::ledger::{LedgerLogReader, LogEntry};
use crate::range_clock::BlockWindow;
use crate::state::{sort_records, ActivityKind, ActivityRecord, SortOrder};
use crate::types::Address;

/// Fetch `Created` and `VoteCast` logs concurrently and merge them.
///
/// Either query failing fails the whole fetch; no partial results are returned.
pub async fn fetch_activity<L>(
    ledger: &L,
    address: &Address,
    window: BlockWindow,
) -> Result<Vec<ActivityRecord>, IndexingError>
where
    L: LedgerLogReader + ?Sized,
{
    let fetch_kind = |kind: ActivityKind| async move {
        ledger
            .get_logs(address, kind, window.from_block, window.to_block)
            .await
            .map_err(|cause| IndexingError::Logs {
                kind,
                from_block: window.from_block,
                to_block: window.to_block,
                cause,
            })
    };

    let (created, votes) = futures::try_join!(
        fetch_kind(ActivityKind::Created),
        fetch_kind(ActivityKind::VoteCast)
    )?;
    debug!(
        "Fetched {} created and {} vote logs in blocks {}..={}",
        created.len(),
        votes.len(),
        window.from_block,
        window.to_block
    );

    let records = created
        .into_iter()
        .chain(votes)
        .filter_map(normalize)
        .collect();
    Ok(merge_records(records))
}

/// Turn a log into a record. Logs still pending (no block number or tx hash) are dropped.
pub fn normalize(entry: LogEntry) -> Option<ActivityRecord> {
    match (entry.block_number, entry.tx_hash) {
        (Some(block_number), Some(tx_hash)) => Some(ActivityRecord {
            block_number,
            tx_hash,
            timestamp: None,
            event: entry.event,
        }),
        _ => {
            warn!(
                "Dropping pending {} log for voting {}",
                entry.event.kind(),
                entry.event.voting_id()
            );
            None
        }
    }
}

/// Deduplicate by record key (first occurrence wins) and sort newest first.
pub fn merge_records(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut merged: Vec<ActivityRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.key()))
        .collect();
    sort_records(&mut merged, SortOrder::Newest);
    merged
}

/// Keep at most `max_display` records from the front of an ordered feed.
pub fn truncate(mut records: Vec<ActivityRecord>, max_display: usize) -> Vec<ActivityRecord> {
    records.truncate(max_display);
    records
}
