use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use ballot_indexer::RefreshOutcome;
use chrono::DateTime;
use once_cell::sync::OnceCell;
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RefreshResult {
    Success,
    Failed,
    Skipped,
}

impl RefreshResult {
    fn as_str(&self) -> &'static str {
        match self {
            RefreshResult::Success => "success",
            RefreshResult::Failed => "failed",
            RefreshResult::Skipped => "skipped",
        }
    }
}

impl From<&RefreshOutcome> for RefreshResult {
    fn from(outcome: &RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Refreshed(_) => RefreshResult::Success,
            RefreshOutcome::Skipped => RefreshResult::Skipped,
        }
    }
}

#[derive(Default)]
pub struct Metrics {
    refresh_total: HashMap<RefreshResult, u64>,
    enrichment_gaps_total: u64,
    tally_read_failures_total: u64,
    last_refresh_unix: Option<u64>,
}

static METRICS: OnceCell<Mutex<Metrics>> = OnceCell::new();

fn get() -> MutexGuard<'static, Metrics> {
    METRICS
        .get_or_init(|| Mutex::new(Metrics::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn record_refresh(result: RefreshResult, at: u64) {
    let mut m = get();
    *m.refresh_total.entry(result).or_insert(0) += 1;
    if result == RefreshResult::Success {
        m.last_refresh_unix = Some(at);
    }
}

pub fn record_enrichment_gaps(count: usize) {
    get().enrichment_gaps_total += count as u64;
}

pub fn record_tally_read_failures(count: usize) {
    get().tally_read_failures_total += count as u64;
}

pub fn reset() {
    *get() = Metrics::default();
}

pub fn snapshot_as_json() -> Value {
    let m = get();

    let refreshes: Vec<Value> = [
        RefreshResult::Success,
        RefreshResult::Failed,
        RefreshResult::Skipped,
    ]
    .iter()
    .map(|result| {
        json!({
            "outcome": result.as_str(),
            "count": m.refresh_total.get(result).copied().unwrap_or(0),
        })
    })
    .collect();

    json!({
        "refresh_total": refreshes,
        "last_refresh_unix": m.last_refresh_unix,
        "last_refresh_at": m
            .last_refresh_unix
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
            .map(|dt| dt.to_rfc3339()),
        "enrichment_gaps_total": m.enrichment_gaps_total,
        "tally_read_failures_total": m.tally_read_failures_total,
    })
}
