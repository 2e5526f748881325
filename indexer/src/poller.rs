//! One polling pass over a mounted tally

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::ledger::VotingStateReader;
use crate::state::VotingSummary;
use crate::tally::{MergeOutcome, TallyAggregator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub summary: VotingSummary,
    /// The tally was rebuilt because the item's identity or option count changed
    pub reset: bool,
    pub changed: usize,
    /// Options whose read failed; their previous value is kept
    pub failed: Vec<u64>,
}

/// Re-read the summary of `voting_id`, then issue one count read per option concurrently.
///
/// Counts are merged in arrival order. Only the summary read can fail the pass.
pub async fn poll_tally<R>(
    reader: &R,
    voting_id: u64,
    tally: &mut TallyAggregator,
) -> Result<PollReport, LedgerError>
where
    R: VotingStateReader + ?Sized,
{
    let summary = reader.voting(voting_id).await?;
    let reset = tally.sync(summary.id, summary.option_count);

    let mut reads: FuturesUnordered<_> = (0..tally.option_count())
        .map(|option_index| async move {
            (option_index, reader.vote_count(voting_id, option_index).await)
        })
        .collect();

    let mut changed = 0;
    let mut failed = Vec::new();
    while let Some((option_index, result)) = reads.next().await {
        match result {
            Ok(votes) => {
                if tally.merge(option_index, votes) == MergeOutcome::Changed {
                    changed += 1;
                }
            }
            Err(e) => {
                warn!(
                    "Vote count read for voting {} option {} failed: {}",
                    voting_id, option_index, e
                );
                failed.push(option_index);
            }
        }
    }
    failed.sort_unstable();

    debug!(
        "Polled voting {}: {} changed, {} failed, total {}",
        voting_id,
        changed,
        failed.len(),
        tally.total()
    );
    Ok(PollReport {
        summary,
        reset,
        changed,
        failed,
    })
}
