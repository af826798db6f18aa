use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use crate::models::{ReviewStatus, VoteContext, VoterId};

/// Minimum number of up-votes for approval
pub const DEFAULT_APPROVAL_THRESHOLD: usize = 2;

/// A collection of voters in one vote direction
pub trait VoteSet {
    /// Number of distinct votes held
    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn contains_voter(&self, voter: &str) -> bool;
}

impl VoteSet for BTreeSet<VoterId> {
    fn count(&self) -> usize {
        self.len()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.contains(voter)
    }
}

impl VoteSet for BTreeSet<String> {
    fn count(&self) -> usize {
        self.len()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.contains(voter)
    }
}

impl<S: BuildHasher> VoteSet for HashSet<String, S> {
    fn count(&self) -> usize {
        self.len()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.contains(voter)
    }
}

impl<S: BuildHasher> VoteSet for HashSet<&str, S> {
    fn count(&self) -> usize {
        self.len()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.contains(voter)
    }
}

impl<T: AsRef<str>> VoteSet for [T] {
    fn count(&self) -> usize {
        self.len()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.iter().any(|v| v.as_ref() == voter)
    }
}

impl<T: AsRef<str>> VoteSet for Vec<T> {
    fn count(&self) -> usize {
        self.as_slice().count()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.as_slice().contains_voter(voter)
    }
}

// A bare string stands for a single voter, never a set of characters.
// Any non-empty string therefore counts as exactly one vote.
impl VoteSet for str {
    fn count(&self) -> usize {
        usize::from(!self.is_empty())
    }

    fn contains_voter(&self, voter: &str) -> bool {
        !self.is_empty() && self == voter
    }
}

impl VoteSet for String {
    fn count(&self) -> usize {
        self.as_str().count()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        self.as_str().contains_voter(voter)
    }
}

impl<T: VoteSet + ?Sized> VoteSet for &T {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn contains_voter(&self, voter: &str) -> bool {
        (**self).contains_voter(voter)
    }
}

/// Anything that exposes an up-vote and a down-vote collection.
///
/// Lets a status be resolved from caller-owned vote storage without going
/// through a [`VoteLedger`](crate::VoteLedger).
pub trait VoteTally {
    type Up: VoteSet + ?Sized;
    type Down: VoteSet + ?Sized;

    fn upvotes(&self) -> &Self::Up;
    fn downvotes(&self) -> &Self::Down;
}

impl VoteTally for VoteContext {
    type Up = BTreeSet<VoterId>;
    type Down = BTreeSet<VoterId>;

    fn upvotes(&self) -> &Self::Up {
        VoteContext::upvotes(self)
    }

    fn downvotes(&self) -> &Self::Down {
        VoteContext::downvotes(self)
    }
}

/// Loosely shaped vote context built from arbitrary collections
#[derive(Debug, Clone, Default)]
pub struct Votes<U, D> {
    pub upvotes: U,
    pub downvotes: D,
}

impl<U, D> Votes<U, D> {
    pub fn new(upvotes: U, downvotes: D) -> Self {
        Self { upvotes, downvotes }
    }
}

impl<U: VoteSet, D: VoteSet> VoteTally for Votes<U, D> {
    type Up = U;
    type Down = D;

    fn upvotes(&self) -> &U {
        &self.upvotes
    }

    fn downvotes(&self) -> &D {
        &self.downvotes
    }
}

/// Resolves a tally into `Rejected`, `Approved` or `Pending`.
///
/// Any down-vote vetoes the review. Otherwise the review is approved once
/// the number of up-votes reaches the threshold. Lifecycle is not this
/// policy's concern, so it never reports `Closed`.
pub struct AcceptanceThreshold<'a, T: VoteTally + ?Sized> {
    context: &'a T,
    threshold: usize,
}

impl<'a, T: VoteTally + ?Sized> AcceptanceThreshold<'a, T> {
    pub fn new(context: &'a T) -> Self {
        Self::with_threshold(context, DEFAULT_APPROVAL_THRESHOLD)
    }

    pub fn with_threshold(context: &'a T, threshold: usize) -> Self {
        Self { context, threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn status(&self) -> ReviewStatus {
        if !self.context.downvotes().is_empty() {
            ReviewStatus::Rejected
        } else if self.context.upvotes().count() >= self.threshold {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Pending
        }
    }
}
