use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::VoteError;

/// Identifier of a reviewer casting a vote.
///
/// Any string is a valid voter id. Deserialization goes through
/// [`VoterId::from_value`], so a non-string value fails with
/// [`VoteError::InvalidVoter`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "String")]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read a voter id out of untyped input, accepting only strings
    pub fn from_value(value: &Value) -> Result<Self, VoteError> {
        match value {
            Value::String(id) => Ok(Self(id.clone())),
            other => Err(VoteError::invalid_voter(format!(
                "expected a string, got {}",
                value_kind(other)
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VoterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for VoterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for VoterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for VoterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<Value> for VoterId {
    type Error = VoteError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(id) => Ok(Self(id)),
            other => Self::from_value(&other),
        }
    }
}

impl From<VoterId> for String {
    fn from(value: VoterId) -> Self {
        value.0
    }
}

/// Direction of a single vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Whether a review item still accepts votes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Open,
    Closed,
}

/// Status of a review, derived from lifecycle and votes on every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Closed,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// The up-voters and down-voters of one review item.
///
/// A voter is never present in both sets. Fields are private so that only
/// the ledger can move voters between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteContext {
    upvotes: BTreeSet<VoterId>,
    downvotes: BTreeSet<VoterId>,
}

impl VoteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upvotes(&self) -> &BTreeSet<VoterId> {
        &self.upvotes
    }

    pub fn downvotes(&self) -> &BTreeSet<VoterId> {
        &self.downvotes
    }

    /// Current vote held by a voter, if any
    pub fn vote_of(&self, voter: &str) -> Option<VoteDirection> {
        if self.upvotes.contains(voter) {
            Some(VoteDirection::Up)
        } else if self.downvotes.contains(voter) {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }

    /// Move a voter into the set for `direction`, returning whether anything changed
    pub(crate) fn record(&mut self, voter: VoterId, direction: VoteDirection) -> bool {
        let (target, other) = match direction {
            VoteDirection::Up => (&mut self.upvotes, &mut self.downvotes),
            VoteDirection::Down => (&mut self.downvotes, &mut self.upvotes),
        };

        let removed = other.remove(voter.as_str());
        let inserted = target.insert(voter);
        removed || inserted
    }
}

/// Read-only, serializable view of a ledger at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub lifecycle: Lifecycle,
    pub approval_threshold: usize,
    pub upvotes: Vec<VoterId>,
    pub downvotes: Vec<VoterId>,
    pub status: ReviewStatus,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(id: &str) -> VoterId {
        VoterId::new(id)
    }

    #[test]
    fn test_any_string_is_a_voter_id() {
        assert_eq!(VoterId::new("").as_str(), "");
        assert_eq!(VoterId::new("dev\t1").as_str(), "dev\t1");
        assert_eq!(VoterId::from("   ").as_str(), "   ");
    }

    #[test]
    fn test_voter_id_from_value() {
        let id = VoterId::from_value(&serde_json::json!("core-dev")).unwrap();
        assert_eq!(id.as_str(), "core-dev");

        let err = VoterId::from_value(&serde_json::json!(["invalid-object"])).unwrap_err();
        assert_eq!(
            err,
            VoteError::invalid_voter("expected a string, got an array")
        );
        assert!(VoterId::from_value(&serde_json::json!(42)).is_err());
        assert!(VoterId::from_value(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_voter_id_deserialize() {
        let parsed: VoterId = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed.as_str(), "");

        let err = serde_json::from_str::<VoterId>("{\"name\": \"dev1\"}").unwrap_err();
        assert!(err.to_string().contains("invalid voter id: expected a string, got an object"));

        let err = serde_yaml::from_str::<VoterId>("[dev1, dev2]").unwrap_err();
        assert!(err.to_string().contains("invalid voter id"));
    }

    #[test]
    fn test_record_moves_between_sets() {
        let mut ctx = VoteContext::new();

        assert!(ctx.record(voter("dev1"), VoteDirection::Down));
        assert_eq!(ctx.vote_of("dev1"), Some(VoteDirection::Down));

        assert!(ctx.record(voter("dev1"), VoteDirection::Up));
        assert_eq!(ctx.vote_of("dev1"), Some(VoteDirection::Up));
        assert!(ctx.downvotes().is_empty());
        assert_eq!(ctx.upvotes().len(), 1);
    }

    #[test]
    fn test_record_same_direction_is_noop() {
        let mut ctx = VoteContext::new();

        assert!(ctx.record(voter("dev1"), VoteDirection::Up));
        assert!(!ctx.record(voter("dev1"), VoteDirection::Up));
        assert_eq!(ctx.upvotes().len(), 1);
        assert_eq!(ctx.vote_of("dev2"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ReviewStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        assert_eq!(ReviewStatus::Closed.to_string(), "closed");
    }
}
