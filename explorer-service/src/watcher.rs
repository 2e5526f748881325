//! Background refresh and tally polling loops

use std::time::Duration;

use ballot_indexer::{countdown::unix_now, poller::poll_tally, IndexingError, RefreshOutcome};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::metrics::{self, RefreshResult};
use crate::state::AppState;

/// Run one refresh and record its outcome.
pub async fn run_refresh(state: &AppState) -> Result<RefreshOutcome, IndexingError> {
    match state.explorer.refresh().await {
        Ok(outcome) => {
            if let RefreshOutcome::Refreshed(summary) = &outcome {
                metrics::record_enrichment_gaps(summary.enrichment_gaps.len());
            }
            metrics::record_refresh(RefreshResult::from(&outcome), unix_now());
            Ok(outcome)
        }
        Err(e) => {
            warn!("Refresh failed, keeping previous data: {}", e);
            metrics::record_refresh(RefreshResult::Failed, unix_now());
            Err(e)
        }
    }
}

/// Poll every mounted tally once.
///
/// A tally whose voting has closed gets one final pass and is then unmounted. One that nobody has
/// viewed within the idle limit is unmounted without a read. Either way the next request for it
/// mounts a fresh one.
pub async fn poll_mounted(state: &AppState) {
    poll_mounted_at(state, unix_now()).await
}

pub async fn poll_mounted_at(state: &AppState, now: u64) {
    let handles = state.board().handles();
    for handle in handles {
        if state.is_idle(handle, now) {
            debug!("Tally {:?} idle, unmounting", handle);
            state.unmount(handle);
            continue;
        }
        let Some(mut tally) = state.board().get(handle).cloned() else {
            continue;
        };
        let voting_id = tally.voting_id();
        match poll_tally(state.chain(), voting_id, &mut tally).await {
            Ok(report) => {
                if !report.failed.is_empty() {
                    metrics::record_tally_read_failures(report.failed.len());
                }
                let closed = !report.summary.is_open(now);
                state.check_in(handle, tally);
                if closed && report.failed.is_empty() {
                    debug!("Voting {} closed, unmounting tally", voting_id);
                    state.unmount(handle);
                }
            }
            Err(e) => {
                metrics::record_tally_read_failures(1);
                warn!("Tally poll for voting {} failed: {}", voting_id, e);
            }
        }
    }
}

pub async fn refresh_loop(state: AppState, every: Duration) {
    info!("Refreshing activity every {:?}", every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        // Errors are logged and counted inside
        let _ = run_refresh(&state).await;
    }
}

pub async fn tally_loop(state: AppState, every: Duration) {
    info!("Polling mounted tallies every {:?}", every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        poll_mounted(&state).await;
    }
}
