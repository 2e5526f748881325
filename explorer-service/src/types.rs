//! Types for HTTP requests and responses

use std::str::FromStr;

use ballot_indexer::{
    card::VotingCard, range_clock::BlockWindow, store::ActivityFilter, ActivityKind, Address,
    RefreshSummary, SortOrder, StatusFilter, ViewerRole,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = String>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse().map(Some).map_err(AppError::BadRequest),
        None => Ok(None),
    }
}

/// Query of `/activity` and `/transactions`
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub kind: Option<String>,
    pub voting_id: Option<String>,
    pub q: Option<String>,
    pub order: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ActivityQuery {
    pub fn filter(&self) -> Result<ActivityFilter, AppError> {
        Ok(ActivityFilter {
            kind: parse_opt::<ActivityKind>(self.kind.as_deref())?,
            voting_id: self.voting_id.clone(),
            query: self.q.clone(),
        })
    }

    pub fn order(&self) -> Result<SortOrder, AppError> {
        Ok(parse_opt(self.order.as_deref())?.unwrap_or_default())
    }
}

/// Query of `/votings`
#[derive(Debug, Default, Deserialize)]
pub struct VotingsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub order: Option<String>,
    pub visible: Option<usize>,
}

impl VotingsQuery {
    pub fn status(&self) -> Result<StatusFilter, AppError> {
        Ok(parse_opt(self.status.as_deref())?.unwrap_or_default())
    }

    pub fn order(&self) -> Result<SortOrder, AppError> {
        Ok(parse_opt(self.order.as_deref())?.unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<String>,
}

impl ViewerQuery {
    pub fn viewer(&self) -> Result<Option<Address>, AppError> {
        match self.viewer.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Address::from_str(v)
                .map(Some)
                .map_err(|e| AppError::BadRequest(format!("invalid viewer: {}", e))),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub contract: Address,
    pub window: Option<BlockWindow>,
    pub refreshed_at: Option<u64>,
    pub refreshing: bool,
    pub events: usize,
    pub explorer_url: Option<String>,
    /// Contract owner, read only when a viewer is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_role: Option<ViewerRole>,
    pub version: &'static str,
    pub git_hash: Option<&'static str>,
    pub build_time_unix: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Refreshed,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: RefreshStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RefreshSummary>,
}

#[derive(Debug, Serialize)]
pub struct VotingsResponse {
    pub total: u64,
    pub visible: usize,
    pub has_more: bool,
    pub cards: Vec<VotingCard>,
}
