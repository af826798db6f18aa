pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod threshold;

pub use config::Config;
pub use error::{VoteError, VoteResult};
pub use ledger::{SharedLedger, VoteLedger};
pub use models::*;
pub use threshold::{AcceptanceThreshold, VoteSet, VoteTally, Votes, DEFAULT_APPROVAL_THRESHOLD};
