pub mod activity;
pub mod block;
pub mod transaction;
pub mod voting;

pub use activity::*;
pub use block::*;
pub use transaction::*;
pub use voting::*;
