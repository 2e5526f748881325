pub mod card;
pub mod catalog;
pub mod config;
pub mod countdown;
pub mod enricher;
pub mod error;
pub mod format;
pub mod intent;
pub mod ledger;
pub mod merger;
pub mod paginator;
pub mod poller;
pub mod range_clock;
pub mod refresh;
pub mod role;
pub mod state;
pub mod store;
pub mod tally;
pub mod transactions;
pub mod types;

pub use config::IndexerConfig;
pub use error::*;
pub use ledger::*;
pub use refresh::{Explorer, RefreshOutcome, RefreshSummary};
pub use role::ViewerRole;
pub use state::*;
pub use types::*;

#[cfg(test)]
mod test_utils;
