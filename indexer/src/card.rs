//! Display card for one voting item

use futures::try_join;
use serde::Serialize;

use crate::countdown::{format_remaining, remaining_secs, time_progress};
use crate::error::LedgerError;
use crate::ledger::VotingStateReader;
use crate::poller::poll_tally;
use crate::state::VotingSummary;
use crate::tally::{TallyAggregator, TallySnapshot};
use crate::types::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotingCard {
    pub summary: VotingSummary,
    pub is_open: bool,
    /// Still flagged active by the contract although its end time has passed
    pub awaiting_close: bool,
    pub options: Vec<String>,
    pub tally: TallySnapshot,
    /// Only known when a viewer address was supplied
    pub has_voted: Option<bool>,
    pub remaining_secs: u64,
    pub remaining: String,
    pub progress_percent: u32,
}

impl VotingCard {
    pub fn build(
        summary: VotingSummary,
        options: Vec<String>,
        tally: &TallyAggregator,
        has_voted: Option<bool>,
        now: u64,
    ) -> Self {
        let is_open = summary.is_open(now);
        let remaining = remaining_secs(summary.end_time, now);
        Self {
            is_open,
            awaiting_close: summary.is_active && !is_open,
            options,
            tally: tally.snapshot(),
            has_voted,
            remaining_secs: remaining,
            remaining: format_remaining(remaining),
            progress_percent: if is_open { time_progress(remaining) } else { 100 },
            summary,
        }
    }

    /// Label of the leading option, if any votes are counted
    pub fn leader_label(&self) -> Option<&str> {
        let leader = self.tally.leader?;
        self.options
            .get(leader.option_index as usize)
            .map(String::as_str)
    }
}

/// Read everything a card needs and refresh `tally` in the same pass.
pub async fn load_card<R>(
    reader: &R,
    voting_id: u64,
    viewer: Option<&Address>,
    tally: &mut TallyAggregator,
    now: u64,
) -> Result<VotingCard, LedgerError>
where
    R: VotingStateReader + ?Sized,
{
    let has_voted = async {
        match viewer {
            Some(address) => reader.has_voted(voting_id, address).await.map(Some),
            None => Ok(None),
        }
    };
    let (options, has_voted) = try_join!(reader.options(voting_id), has_voted)?;
    let report = poll_tally(reader, voting_id, tally).await?;
    Ok(VotingCard::build(report.summary, options, tally, has_voted, now))
}
