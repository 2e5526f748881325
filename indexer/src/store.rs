//! The enriched activity snapshot and its filtered views

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::range_clock::BlockWindow;
use crate::state::{sort_records, ActivityKind, ActivityRecord, BlockSummary, SortOrder, TransactionView};
use crate::transactions::derive_transactions;

/// Filter predicates as entered by a viewer. All present predicates must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub kind: Option<ActivityKind>,
    /// Raw voting id text; must be decimal digits to match anything
    pub voting_id: Option<String>,
    /// Free-text substring query
    pub query: Option<String>,
}

/// Predicates after trimming and parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalFilter {
    /// The voting id text cannot match any record
    MatchNone,
    Predicates {
        kind: Option<ActivityKind>,
        voting_id: Option<u64>,
        query: Option<String>,
    },
}

impl ActivityFilter {
    pub fn kind(kind: ActivityKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn voting_id(text: impl Into<String>) -> Self {
        Self {
            voting_id: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn canonicalize(&self) -> CanonicalFilter {
        let voting_id = match self.voting_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => match parse_voting_id(text) {
                Some(id) => Some(id),
                None => return CanonicalFilter::MatchNone,
            },
        };
        let query = self
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        CanonicalFilter::Predicates {
            kind: self.kind,
            voting_id,
            query,
        }
    }
}

/// Plain decimal digits only. Forms such as `1.0`, `0x1` or `+1` match nothing.
fn parse_voting_id(text: &str) -> Option<u64> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl CanonicalFilter {
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        match self {
            CanonicalFilter::MatchNone => false,
            CanonicalFilter::Predicates {
                kind,
                voting_id,
                query,
            } => {
                kind.map_or(true, |k| record.kind() == k)
                    && voting_id.map_or(true, |id| record.voting_id() == id)
                    && query.as_deref().map_or(true, |q| {
                        record
                            .search_fields()
                            .iter()
                            .any(|field| field.to_lowercase().contains(q))
                    })
            }
        }
    }
}

/// Apply `filter` and order the survivors.
pub fn filter_records(
    records: &[ActivityRecord],
    filter: &ActivityFilter,
    order: SortOrder,
) -> Vec<ActivityRecord> {
    let canonical = filter.canonicalize();
    let mut out: Vec<ActivityRecord> = records
        .iter()
        .filter(|r| canonical.matches(r))
        .cloned()
        .collect();
    sort_records(&mut out, order);
    out
}

/// KPI counters over the current snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityStats {
    pub total: usize,
    pub created: usize,
    pub votes: usize,
    pub unique_txs: usize,
}

/// One refresh worth of indexed data. Replaced wholesale on each refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStore {
    records: Vec<ActivityRecord>,
    blocks: Vec<BlockSummary>,
    window: Option<BlockWindow>,
    refreshed_at: Option<u64>,
}

impl ActivityStore {
    pub fn new(
        records: Vec<ActivityRecord>,
        blocks: Vec<BlockSummary>,
        window: BlockWindow,
        refreshed_at: u64,
    ) -> Self {
        Self {
            records,
            blocks,
            window: Some(window),
            refreshed_at: Some(refreshed_at),
        }
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn blocks(&self) -> &[BlockSummary] {
        &self.blocks
    }

    pub fn window(&self) -> Option<BlockWindow> {
        self.window
    }

    pub fn refreshed_at(&self) -> Option<u64> {
        self.refreshed_at
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.blocks.is_empty()
    }

    pub fn filter(&self, filter: &ActivityFilter, order: SortOrder) -> Vec<ActivityRecord> {
        filter_records(&self.records, filter, order)
    }

    /// Transaction rows derived from the filtered activity
    pub fn transactions(&self, filter: &ActivityFilter, order: SortOrder) -> Vec<TransactionView> {
        derive_transactions(&self.filter(filter, order), order)
    }

    pub fn stats(&self) -> ActivityStats {
        let created = self
            .records
            .iter()
            .filter(|r| r.kind() == ActivityKind::Created)
            .count();
        let unique_txs = self
            .records
            .iter()
            .map(|r| r.tx_hash)
            .collect::<HashSet<_>>()
            .len();
        ActivityStats {
            total: self.records.len(),
            created,
            votes: self.records.len() - created,
            unique_txs,
        }
    }
}
