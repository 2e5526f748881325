//! Per-item vote tallies and the arena that owns them

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::state::VotingSummary;
use crate::types::{serialize_option_u128_as_string, serialize_u128_as_string};

/// Upper bound on options tracked for one voting item
pub const MAX_OPTIONS: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Changed,
    Unchanged,
    /// Index not below the item's option count; the arrival was ignored
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Leader {
    pub option_index: u64,
    #[serde(serialize_with = "serialize_u128_as_string")]
    pub votes: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionShare {
    pub index: u64,
    /// Absent until this option's count has arrived
    #[serde(serialize_with = "serialize_option_u128_as_string")]
    pub votes: Option<u128>,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub voting_id: u64,
    pub option_count: u64,
    #[serde(serialize_with = "serialize_u128_as_string")]
    pub total: u128,
    pub leader: Option<Leader>,
    pub options: Vec<OptionShare>,
}

/// Vote counts of one voting item, merged last-value-wins as reads arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyAggregator {
    voting_id: u64,
    option_count: u64,
    counts: BTreeMap<u64, u128>,
}

impl TallyAggregator {
    pub fn new(voting_id: u64, option_count: u64) -> Self {
        Self {
            voting_id,
            option_count: cap_options(voting_id, option_count),
            counts: BTreeMap::new(),
        }
    }

    pub fn voting_id(&self) -> u64 {
        self.voting_id
    }

    pub fn option_count(&self) -> u64 {
        self.option_count
    }

    /// Rebuild from empty if identity or option count changed. Returns whether a reset happened.
    pub fn sync(&mut self, voting_id: u64, option_count: u64) -> bool {
        let option_count = cap_options(voting_id, option_count);
        if self.voting_id == voting_id && self.option_count == option_count {
            return false;
        }
        debug!(
            "Resetting tally: voting {} ({} options) -> voting {} ({} options)",
            self.voting_id, self.option_count, voting_id, option_count
        );
        *self = Self {
            voting_id,
            option_count,
            counts: BTreeMap::new(),
        };
        true
    }

    pub fn merge(&mut self, option_index: u64, votes: u128) -> MergeOutcome {
        if option_index >= self.option_count {
            warn!(
                "Ignoring count for option {} of voting {} with {} options",
                option_index, self.voting_id, self.option_count
            );
            return MergeOutcome::OutOfRange;
        }
        match self.counts.insert(option_index, votes) {
            Some(previous) if previous == votes => MergeOutcome::Unchanged,
            _ => MergeOutcome::Changed,
        }
    }

    pub fn count(&self, option_index: u64) -> Option<u128> {
        self.counts.get(&option_index).copied()
    }

    /// Number of options whose count has arrived
    pub fn known(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u128 {
        self.counts
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v))
    }

    /// Option with the most votes. Ties go to the lowest index. None while no votes are counted.
    pub fn leader(&self) -> Option<Leader> {
        if self.total() == 0 {
            return None;
        }
        let mut best: Option<Leader> = None;
        for (&option_index, &votes) in &self.counts {
            if best.map_or(true, |b| votes > b.votes) {
                best = Some(Leader {
                    option_index,
                    votes,
                });
            }
        }
        best
    }

    /// Rounded share of the total in percent, 0 when nothing is counted.
    pub fn percentage(&self, option_index: u64) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let votes = self.count(option_index).unwrap_or(0);
        (votes as f64 * 100.0 / total as f64).round() as u32
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            voting_id: self.voting_id,
            option_count: self.option_count,
            total: self.total(),
            leader: self.leader(),
            options: (0..self.option_count)
                .map(|index| OptionShare {
                    index,
                    votes: self.count(index),
                    percentage: self.percentage(index),
                })
                .collect(),
        }
    }
}

fn cap_options(voting_id: u64, option_count: u64) -> u64 {
    if option_count > MAX_OPTIONS {
        warn!(
            "Voting {} reports {} options, tracking the first {}",
            voting_id, option_count, MAX_OPTIONS
        );
    }
    option_count.min(MAX_OPTIONS)
}

/// Generational handle to a mounted tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TallyHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    tally: Option<TallyAggregator>,
}

/// Arena of tallies for the voting items currently on display.
#[derive(Debug, Default)]
pub struct TallyBoard {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TallyBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, summary: &VotingSummary) -> TallyHandle {
        let tally = TallyAggregator::new(summary.id, summary.option_count);
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.tally = Some(tally);
                TallyHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    tally: Some(tally),
                });
                TallyHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Drop the tally behind `handle`. Every outstanding copy of the handle goes stale.
    pub fn unmount(&mut self, handle: TallyHandle) -> Option<TallyAggregator> {
        let slot = self.live_slot_mut(handle)?;
        let tally = slot.tally.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        tally
    }

    pub fn get(&self, handle: TallyHandle) -> Option<&TallyAggregator> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.tally.as_ref()
    }

    pub fn get_mut(&mut self, handle: TallyHandle) -> Option<&mut TallyAggregator> {
        self.live_slot_mut(handle)?.tally.as_mut()
    }

    /// Handle of the mounted tally for `voting_id`, if any
    pub fn find(&self, voting_id: u64) -> Option<TallyHandle> {
        self.iter()
            .find(|(_, tally)| tally.voting_id() == voting_id)
            .map(|(handle, _)| handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TallyHandle, &TallyAggregator)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.tally.as_ref().map(|tally| {
                (
                    TallyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    tally,
                )
            })
        })
    }

    pub fn handles(&self) -> Vec<TallyHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_slot_mut(&mut self, handle: TallyHandle) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.tally.is_none() {
            return None;
        }
        Some(slot)
    }
}
