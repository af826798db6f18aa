use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use super::VoteLedger;
use crate::error::VoteResult;
use crate::models::{LedgerSnapshot, ReviewStatus};

/// Thread-safe handle to a [`VoteLedger`].
///
/// Each vote runs under a single lock acquisition, so the remove-then-insert
/// across the two vote sets is never observed half done.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    id: Uuid,
    inner: Arc<Mutex<VoteLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: VoteLedger) -> Self {
        Self {
            id: ledger.id(),
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, VoteLedger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn upvote(&self, voter: impl Into<String>) -> VoteResult<bool> {
        self.lock().upvote(voter)
    }

    pub fn downvote(&self, voter: impl Into<String>) -> VoteResult<bool> {
        self.lock().downvote(voter)
    }

    pub fn upvote_value(&self, voter: &Value) -> VoteResult<bool> {
        self.lock().upvote_value(voter)
    }

    pub fn downvote_value(&self, voter: &Value) -> VoteResult<bool> {
        self.lock().downvote_value(voter)
    }

    pub fn close(&self) {
        self.lock().close()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_closed()
    }

    pub fn status(&self) -> ReviewStatus {
        self.lock().status()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock().snapshot()
    }

    /// Run a read-only closure against the ledger while holding the lock
    pub fn with<R>(&self, f: impl FnOnce(&VoteLedger) -> R) -> R {
        f(&self.lock())
    }
}

impl From<VoteLedger> for SharedLedger {
    fn from(ledger: VoteLedger) -> Self {
        Self::new(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_votes_keep_sets_disjoint() {
        let ledger = SharedLedger::new(VoteLedger::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    for round in 0..200 {
                        let voter = format!("dev{}", round % 5);
                        if (i + round) % 2 == 0 {
                            ledger.upvote(voter).unwrap();
                        } else {
                            ledger.downvote(voter).unwrap();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        ledger.with(|inner| {
            let ctx = inner.context();
            assert!(ctx.upvotes().is_disjoint(ctx.downvotes()));
            assert_eq!(ctx.upvotes().len() + ctx.downvotes().len(), 5);
        });
    }

    #[test]
    fn test_close_visible_to_all_handles() {
        let ledger = SharedLedger::from(VoteLedger::new());
        let other = ledger.clone();

        ledger.upvote("dev1").unwrap();
        other.close();

        assert!(ledger.is_closed());
        assert_eq!(ledger.status(), ReviewStatus::Closed);
        assert!(ledger.downvote("dev1").unwrap_err().is_closed_ledger());
        assert_eq!(ledger.snapshot().upvotes.len(), 1);
        assert_eq!(ledger.id(), other.id());
    }
}
