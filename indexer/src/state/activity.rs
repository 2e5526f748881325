use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Address, TxHash};

/// The two contract events the indexer follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    VoteCast,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 2] = [ActivityKind::Created, ActivityKind::VoteCast];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Created => "created",
            ActivityKind::VoteCast => "vote_cast",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "created" | "voting_created" => Ok(ActivityKind::Created),
            "vote_cast" | "votecast" | "vote" => Ok(ActivityKind::VoteCast),
            other => Err(format!("invalid activity kind: {}", other)),
        }
    }
}

/// Decoded payload of a contract event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    Created {
        voting_id: u64,
        creator: Address,
        title: String,
        end_time: u64,
        option_count: u64,
    },
    VoteCast {
        voting_id: u64,
        voter: Address,
        option_index: u64,
    },
}

impl ActivityEvent {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityEvent::Created { .. } => ActivityKind::Created,
            ActivityEvent::VoteCast { .. } => ActivityKind::VoteCast,
        }
    }

    pub fn voting_id(&self) -> u64 {
        match self {
            ActivityEvent::Created { voting_id, .. } | ActivityEvent::VoteCast { voting_id, .. } => {
                *voting_id
            }
        }
    }
}

/// One indexed contract event, optionally enriched with its block timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub block_number: u64,
    pub tx_hash: TxHash,
    /// Block timestamp (Unix seconds), absent until enriched or when the lookup failed
    pub timestamp: Option<u64>,
    #[serde(flatten)]
    pub event: ActivityEvent,
}

/// Uniqueness key of an activity record: `(tx_hash, kind, voting_id, option_index?)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub tx_hash: TxHash,
    pub kind: ActivityKind,
    pub voting_id: u64,
    pub option_index: Option<u64>,
}

impl ActivityRecord {
    pub fn kind(&self) -> ActivityKind {
        self.event.kind()
    }

    pub fn voting_id(&self) -> u64 {
        self.event.voting_id()
    }

    pub fn option_index(&self) -> Option<u64> {
        match &self.event {
            ActivityEvent::VoteCast { option_index, .. } => Some(*option_index),
            ActivityEvent::Created { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.event {
            ActivityEvent::Created { title, .. } => Some(title),
            ActivityEvent::VoteCast { .. } => None,
        }
    }

    pub fn creator(&self) -> Option<&Address> {
        match &self.event {
            ActivityEvent::Created { creator, .. } => Some(creator),
            ActivityEvent::VoteCast { .. } => None,
        }
    }

    pub fn voter(&self) -> Option<&Address> {
        match &self.event {
            ActivityEvent::VoteCast { voter, .. } => Some(voter),
            ActivityEvent::Created { .. } => None,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            tx_hash: self.tx_hash,
            kind: self.kind(),
            voting_id: self.voting_id(),
            option_index: self.option_index(),
        }
    }

    /// Fields covered by free-text search, in display form.
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.tx_hash.to_string()];
        if let Some(title) = self.title() {
            fields.push(title.to_string());
        }
        if let Some(creator) = self.creator() {
            fields.push(creator.to_string());
        }
        if let Some(voter) = self.voter() {
            fields.push(voter.to_string());
        }
        fields.push(self.voting_id().to_string());
        if let Some(option_index) = self.option_index() {
            fields.push(option_index.to_string());
        }
        fields.push(self.block_number.to_string());
        fields
    }
}

/// Block ordering toggle for list views. Ties always break on ascending tx hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "desc" | "recent" => Ok(SortOrder::Newest),
            "oldest" | "asc" => Ok(SortOrder::Oldest),
            other => Err(format!("invalid sort order: {}", other)),
        }
    }
}

/// Total order over records for a given block direction.
pub fn compare_records(a: &ActivityRecord, b: &ActivityRecord, order: SortOrder) -> Ordering {
    let by_block = match order {
        SortOrder::Newest => b.block_number.cmp(&a.block_number),
        SortOrder::Oldest => a.block_number.cmp(&b.block_number),
    };
    by_block
        .then_with(|| a.tx_hash.cmp(&b.tx_hash))
        .then_with(|| a.kind().cmp(&b.kind()))
        .then_with(|| a.voting_id().cmp(&b.voting_id()))
        .then_with(|| a.option_index().cmp(&b.option_index()))
}

pub fn sort_records(records: &mut [ActivityRecord], order: SortOrder) {
    records.sort_by(|a, b| compare_records(a, b, order));
}
