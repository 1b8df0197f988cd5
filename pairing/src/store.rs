use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::PairingError;
use crate::types::{MatchRecord, PairKey};

/// A user counts as matched once they appear on either side of this many
/// match records.
pub const MATCH_LIMIT: usize = 5;

/// MatchStore is the persistence capability for committed pairings.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait MatchStore: Send + Sync {
    /// Every recorded pair as unordered keys.
    async fn existing_pairs(&self) -> Result<HashSet<PairKey>, PairingError>;

    /// Number of match records the user appears in, on either side.
    async fn match_count(&self, user_id: i64) -> Result<usize, PairingError>;

    /// Derived matched status: the record count has reached [`MATCH_LIMIT`].
    /// Never stored; always computed from the records.
    async fn is_matched(&self, user_id: i64) -> Result<bool, PairingError> {
        Ok(self.match_count(user_id).await? >= MATCH_LIMIT)
    }

    /// Persist a batch of records. All-or-nothing: either every record in
    /// the batch is stored or none is.
    async fn commit(&self, records: &[MatchRecord]) -> Result<(), PairingError>;
}

/// In-memory MatchStore. Intended for tests and embedded use.
pub struct MemoryMatchStore {
    records: RwLock<Vec<MatchRecord>>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// All records in commit order.
    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.read().expect("lock poisoned").clone()
    }
}

impl Default for MemoryMatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MatchStore for MemoryMatchStore {
    async fn existing_pairs(&self) -> Result<HashSet<PairKey>, PairingError> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records.iter().map(|r| r.key()).collect())
    }

    async fn match_count(&self, user_id: i64) -> Result<usize, PairingError> {
        let records = self.records.read().expect("lock poisoned");
        Ok(records.iter().filter(|r| r.key().contains(user_id)).count())
    }

    async fn commit(&self, new: &[MatchRecord]) -> Result<(), PairingError> {
        let mut records = self.records.write().expect("lock poisoned");
        records.extend_from_slice(new);
        Ok(())
    }
}
