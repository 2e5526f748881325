//! Validated write intents handed to a [`WriteSubmitter`](crate::ledger::WriteSubmitter)

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;

use crate::error::IntentError;
use crate::state::VotingSummary;
use crate::tally::MAX_OPTIONS;

pub const MAX_TITLE_CHARS: usize = 120;
pub const MIN_OPTIONS: usize = 2;
/// Longest allowed voting duration: 30 days
pub const MAX_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub fn seconds(&self) -> u64 {
        match self {
            DurationUnit::Minutes => 60,
            DurationUnit::Hours => 60 * 60,
            DurationUnit::Days => 24 * 60 * 60,
            DurationUnit::Weeks => 7 * 24 * 60 * 60,
        }
    }
}

impl FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(DurationUnit::Minutes),
            "h" | "hour" | "hours" => Ok(DurationUnit::Hours),
            "d" | "day" | "days" => Ok(DurationUnit::Days),
            "w" | "week" | "weeks" => Ok(DurationUnit::Weeks),
            other => Err(format!("invalid duration unit: {}", other)),
        }
    }
}

/// Seconds for `value` units, floored and capped at [`MAX_DURATION_SECS`].
pub fn duration_secs(value: f64, unit: DurationUnit) -> Result<u64, IntentError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IntentError::InvalidDuration);
    }
    let raw = (value * unit.seconds() as f64).floor();
    let secs = raw.min(MAX_DURATION_SECS as f64) as u64;
    if secs == 0 {
        return Err(IntentError::InvalidDuration);
    }
    Ok(secs)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateVotingIntent {
    pub title: String,
    pub options: Vec<String>,
    pub duration_secs: u64,
}

impl CreateVotingIntent {
    pub fn new<S: AsRef<str>>(
        title: &str,
        options: &[S],
        duration_value: f64,
        unit: DurationUnit,
    ) -> Result<Self, IntentError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(IntentError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(IntentError::TitleTooLong {
                max: MAX_TITLE_CHARS,
            });
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(options.len());
        for option in options {
            let option = option.as_ref().trim();
            if option.is_empty() {
                continue;
            }
            if !seen.insert(option.to_lowercase()) {
                return Err(IntentError::DuplicateOption(option.to_string()));
            }
            cleaned.push(option.to_string());
        }
        if cleaned.len() < MIN_OPTIONS {
            return Err(IntentError::TooFewOptions { min: MIN_OPTIONS });
        }
        if cleaned.len() as u64 > MAX_OPTIONS {
            return Err(IntentError::TooManyOptions {
                max: MAX_OPTIONS as usize,
            });
        }

        Ok(Self {
            title: title.to_string(),
            options: cleaned,
            duration_secs: duration_secs(duration_value, unit)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CastVoteIntent {
    pub voting_id: u64,
    pub option_index: u64,
}

impl CastVoteIntent {
    /// Allowed only while the voting is open, for an existing option, by someone who has not voted.
    pub fn new(
        summary: &VotingSummary,
        option_index: u64,
        has_voted: bool,
        now: u64,
    ) -> Result<Self, IntentError> {
        if !summary.is_open(now) {
            return Err(IntentError::VotingClosed(summary.id));
        }
        if option_index >= summary.option_count {
            return Err(IntentError::OptionOutOfRange {
                voting_id: summary.id,
                option_index,
            });
        }
        if has_voted {
            return Err(IntentError::AlreadyVoted(summary.id));
        }
        Ok(Self {
            voting_id: summary.id,
            option_index,
        })
    }
}
