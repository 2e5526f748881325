use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Remote facts about one voting item as read from contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingSummary {
    pub id: u64,
    pub title: String,
    pub creator: Address,
    /// Unix seconds at which voting closes
    pub end_time: u64,
    pub option_count: u64,
    pub is_active: bool,
}

impl VotingSummary {
    /// A voting is open while the contract flags it active and its end time has not passed.
    pub fn is_open(&self, now: u64) -> bool {
        self.is_active && now < self.end_time
    }
}

/// Status filter applied to voting cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Closed,
}

impl StatusFilter {
    /// Uses the same open test as the card badge, so a voting past its end time counts as
    /// closed even while the contract still flags it active.
    pub fn matches(&self, summary: &VotingSummary, now: u64) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => summary.is_open(now),
            StatusFilter::Closed => !summary.is_open(now),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" | "open" => Ok(StatusFilter::Active),
            "closed" | "ended" => Ok(StatusFilter::Closed),
            other => Err(format!("invalid status filter: {}", other)),
        }
    }
}
