//! Owner or voter role of a connected account

use serde::Serialize;

use crate::error::{IntentError, LedgerError};
use crate::ledger::VotingStateReader;
use crate::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// Contract administrator, may create votings
    Owner,
    Voter,
}

impl ViewerRole {
    /// Addresses compare by bytes, so letter case in their text form never matters.
    pub fn of(viewer: &Address, owner: &Address) -> Self {
        if viewer == owner {
            ViewerRole::Owner
        } else {
            ViewerRole::Voter
        }
    }

    pub fn can_create(&self) -> bool {
        matches!(self, ViewerRole::Owner)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewerRole::Owner => "Owner (admin)",
            ViewerRole::Voter => "Voter",
        }
    }
}

/// Role of `viewer` together with the owner it was resolved against.
pub async fn resolve_role<R>(reader: &R, viewer: &Address) -> Result<(Address, ViewerRole), LedgerError>
where
    R: VotingStateReader + ?Sized,
{
    let owner = reader.owner().await?;
    Ok((owner, ViewerRole::of(viewer, &owner)))
}

/// Reject `sender` unless it owns the contract.
pub fn require_owner(sender: &Address, owner: &Address) -> Result<(), IntentError> {
    if ViewerRole::of(sender, owner).can_create() {
        Ok(())
    } else {
        Err(IntentError::NotOwner(*sender))
    }
}
