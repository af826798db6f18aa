pub mod shared;

pub use shared::SharedLedger;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{VoteError, VoteResult};
use crate::models::{
    LedgerSnapshot, Lifecycle, ReviewStatus, VoteContext, VoteDirection, VoterId,
};
use crate::threshold::{AcceptanceThreshold, DEFAULT_APPROVAL_THRESHOLD};

/// Vote bookkeeping for a single review item
#[derive(Debug, Clone)]
pub struct VoteLedger {
    id: Uuid,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    lifecycle: Lifecycle,
    context: VoteContext,
    approval_threshold: usize,
    max_voter_len: Option<usize>,
}

impl Default for VoteLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_APPROVAL_THRESHOLD)
    }

    pub fn with_threshold(approval_threshold: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            closed_at: None,
            lifecycle: Lifecycle::Open,
            context: VoteContext::new(),
            approval_threshold,
            max_voter_len: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut ledger = Self::with_threshold(config.voting.approval_threshold);
        ledger.max_voter_len = config.voting.max_voter_len;
        ledger
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    pub fn approval_threshold(&self) -> usize {
        self.approval_threshold
    }

    pub fn context(&self) -> &VoteContext {
        &self.context
    }

    pub fn vote_of(&self, voter: &str) -> Option<VoteDirection> {
        self.context.vote_of(voter)
    }

    /// Record an up-vote, withdrawing any down-vote by the same voter.
    ///
    /// Returns `true` if the vote context changed.
    pub fn upvote(&mut self, voter: impl Into<String>) -> VoteResult<bool> {
        self.ensure_open()?;
        self.cast(VoterId::new(voter), VoteDirection::Up)
    }

    /// Record a down-vote, withdrawing any up-vote by the same voter.
    ///
    /// Returns `true` if the vote context changed.
    pub fn downvote(&mut self, voter: impl Into<String>) -> VoteResult<bool> {
        self.ensure_open()?;
        self.cast(VoterId::new(voter), VoteDirection::Down)
    }

    /// Up-vote with a voter id taken from untyped input such as a decoded request body
    pub fn upvote_value(&mut self, voter: &Value) -> VoteResult<bool> {
        self.ensure_open()?;
        self.cast(VoterId::from_value(voter)?, VoteDirection::Up)
    }

    /// Down-vote with a voter id taken from untyped input
    pub fn downvote_value(&mut self, voter: &Value) -> VoteResult<bool> {
        self.ensure_open()?;
        self.cast(VoterId::from_value(voter)?, VoteDirection::Down)
    }

    fn cast(&mut self, voter: VoterId, direction: VoteDirection) -> VoteResult<bool> {
        if let Some(max_len) = self.max_voter_len {
            if voter.as_str().chars().count() > max_len {
                return Err(VoteError::invalid_voter(format!(
                    "voter id exceeds {} characters",
                    max_len
                )));
            }
        }

        debug!(
            ledger_id = %self.id,
            voter = %voter,
            direction = ?direction,
            "Recording vote"
        );

        let changed = self.context.record(voter, direction);

        debug!(
            ledger_id = %self.id,
            changed,
            status = %self.status(),
            "Vote recorded"
        );

        Ok(changed)
    }

    fn ensure_open(&self) -> VoteResult<()> {
        if self.is_closed() {
            warn!(ledger_id = %self.id, "Rejected vote on closed ledger");
            return Err(VoteError::ClosedLedger { ledger_id: self.id });
        }
        Ok(())
    }

    /// Close the ledger to further votes. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.is_closed() {
            debug!(ledger_id = %self.id, "Ledger already closed");
            return;
        }

        self.lifecycle = Lifecycle::Closed;
        self.closed_at = Some(Utc::now());

        info!(
            ledger_id = %self.id,
            upvotes = self.context.upvotes().len(),
            downvotes = self.context.downvotes().len(),
            "Closed ledger"
        );
    }

    pub fn status(&self) -> ReviewStatus {
        if self.is_closed() {
            return ReviewStatus::Closed;
        }
        AcceptanceThreshold::with_threshold(&self.context, self.approval_threshold).status()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            id: self.id,
            created_at: self.created_at,
            closed_at: self.closed_at,
            lifecycle: self.lifecycle,
            approval_threshold: self.approval_threshold,
            upvotes: self.context.upvotes().iter().cloned().collect(),
            downvotes: self.context.downvotes().iter().cloned().collect(),
            status: self.status(),
        }
    }
}
