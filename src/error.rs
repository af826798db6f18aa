use thiserror::Error;
use uuid::Uuid;

/// Errors raised when casting a vote
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// Vote attempted after the ledger was closed
    #[error("can't vote on a closed merge request (ledger {ledger_id})")]
    ClosedLedger { ledger_id: Uuid },

    /// Voter identifier is not a usable id
    #[error("invalid voter id: {reason}")]
    InvalidVoter { reason: String },
}

impl VoteError {
    pub fn invalid_voter(reason: impl Into<String>) -> Self {
        Self::InvalidVoter {
            reason: reason.into(),
        }
    }

    pub fn is_closed_ledger(&self) -> bool {
        matches!(self, Self::ClosedLedger { .. })
    }
}

pub type VoteResult<T> = Result<T, VoteError>;
