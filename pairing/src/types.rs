use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// PairKey identifies an unordered user pair. The constructor normalizes
/// the ordering, so `{A,B}` and `{B,A}` produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(i64, i64);

impl PairKey {
    pub fn new(a: i64, b: i64) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// The pair's user ids, lower id first.
    pub fn users(&self) -> (i64, i64) {
        (self.0, self.1)
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.0 == user_id || self.1 == user_id
    }
}

/// MatchRecord is one committed roommate pairing.
///
/// Stored with an ordering (user/peer) but conceptually unordered; use
/// [`MatchRecord::key`] for membership checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub user_id: i64,
    pub peer_id: i64,
    pub score: f32,
    #[serde(rename = "ts")]
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.user_id, self.peer_id)
    }
}

/// BestMatch is one entry in a user's best-matches result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMatch {
    pub peer_id: i64,
    pub score: f32,
}

/// RoundOutcome is the result of a full matching run.
#[derive(Debug)]
pub enum RoundOutcome {
    /// The run completed. `capped` is true when the round cap stopped a
    /// run that was still accepting pairs; everything committed stays
    /// committed either way.
    Completed {
        /// All pairs committed across the run, in acceptance order.
        pairs: Vec<MatchRecord>,
        /// Number of rounds that committed at least one pair.
        rounds: usize,
        capped: bool,
    },

    /// Fewer than two eligible users existed at the start; no round ran.
    Insufficient { available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(3, 9), PairKey::new(9, 3));
        assert_eq!(PairKey::new(3, 9).users(), (3, 9));
        assert_eq!(PairKey::new(9, 3).users(), (3, 9));
    }

    #[test]
    fn test_pair_key_contains() {
        let key = PairKey::new(5, 2);
        assert!(key.contains(2));
        assert!(key.contains(5));
        assert!(!key.contains(3));
    }

    #[test]
    fn test_record_key_ignores_storage_order() {
        let now = Utc::now();
        let a = MatchRecord { user_id: 1, peer_id: 2, score: 0.9, created_at: now };
        let b = MatchRecord { user_id: 2, peer_id: 1, score: 0.9, created_at: now };
        assert_eq!(a.key(), b.key());
    }
}
