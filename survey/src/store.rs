use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::SurveyError;
use crate::response::RawResponse;

/// ResponseStore supplies questionnaire submissions to the matching engine.
///
/// A user may submit the questionnaire more than once; only the most recent
/// submission counts. Implementations must be safe for concurrent use
/// (Send + Sync).
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    /// Return the latest submission for a user, or `None` if the user has
    /// never submitted.
    async fn latest(&self, user_id: i64) -> Result<Option<RawResponse>, SurveyError>;

    /// Return every user's latest submission, one entry per user, ordered
    /// by ascending user id.
    async fn all_latest(&self) -> Result<Vec<RawResponse>, SurveyError>;
}

/// In-memory ResponseStore keeping the full submission history per user.
/// Intended for tests and embedded use.
pub struct MemoryResponseStore {
    responses: RwLock<HashMap<i64, Vec<RawResponse>>>,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
        }
    }

    /// Record a submission. Does not replace earlier submissions; `latest`
    /// picks the winner by submission time (later insertion wins ties).
    pub fn add(&self, response: RawResponse) {
        let mut map = self.responses.write().expect("lock poisoned");
        map.entry(response.user_id).or_default().push(response);
    }

    fn latest_of(history: &[RawResponse]) -> Option<RawResponse> {
        let mut best: Option<&RawResponse> = None;
        for r in history {
            match best {
                Some(b) if r.submitted_at < b.submitted_at => {}
                _ => best = Some(r),
            }
        }
        best.cloned()
    }
}

impl Default for MemoryResponseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ResponseStore for MemoryResponseStore {
    async fn latest(&self, user_id: i64) -> Result<Option<RawResponse>, SurveyError> {
        let map = self.responses.read().expect("lock poisoned");
        Ok(map.get(&user_id).and_then(|h| Self::latest_of(h)))
    }

    async fn all_latest(&self) -> Result<Vec<RawResponse>, SurveyError> {
        let map = self.responses.read().expect("lock poisoned");
        let mut ids: Vec<i64> = map.keys().copied().collect();
        ids.sort_unstable();

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(latest) = map.get(&id).and_then(|h| Self::latest_of(h)) {
                out.push(latest);
            }
        }
        Ok(out)
    }
}
