//! Block timestamp enrichment and recent block headers

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::ledger::LedgerLogReader;
use crate::state::{ActivityRecord, BlockSummary};

/// Outcome of one enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// Distinct blocks whose timestamp was resolved
    pub resolved: usize,
    /// Blocks whose lookup failed; their records keep no timestamp
    pub gaps: Vec<u64>,
}

/// Resolve one timestamp per distinct block among `records`, one lookup at a time.
///
/// Failed lookups are not retried and leave the affected records without a timestamp.
pub async fn enrich_timestamps<L>(
    ledger: &L,
    records: &mut [ActivityRecord],
) -> EnrichmentReport
where
    L: LedgerLogReader + ?Sized,
{
    let blocks: BTreeSet<u64> = records.iter().map(|r| r.block_number).collect();
    let mut timestamps = HashMap::with_capacity(blocks.len());
    let mut report = EnrichmentReport::default();

    for number in blocks.into_iter().rev() {
        match ledger.block(number).await {
            Ok(block) => {
                timestamps.insert(number, block.timestamp);
                report.resolved += 1;
            }
            Err(e) => {
                warn!("Timestamp lookup for block {} failed: {}", number, e);
                report.gaps.push(number);
            }
        }
    }

    for record in records.iter_mut() {
        record.timestamp = timestamps.get(&record.block_number).copied();
    }
    debug!(
        "Enriched {} records over {} blocks ({} gaps)",
        records.len(),
        report.resolved,
        report.gaps.len()
    );
    report
}

/// Headers of the `count` most recent blocks down from `latest_block`, newest first.
///
/// Lookups run sequentially. A failed lookup is skipped.
pub async fn fetch_recent_blocks<L>(ledger: &L, latest_block: u64, count: usize) -> Vec<BlockSummary>
where
    L: LedgerLogReader + ?Sized,
{
    let mut blocks = Vec::with_capacity(count);
    for offset in 0..count as u64 {
        let Some(number) = latest_block.checked_sub(offset) else {
            break;
        };
        match ledger.block(number).await {
            Ok(block) => blocks.push(block),
            Err(e) => warn!("Skipping recent block {}: {}", number, e),
        }
    }
    blocks
}
