use std::collections::HashMap;
use std::sync::Arc;

use bunkmate_survey::{ResponseStore, ResponseVector};

use crate::error::ClusterError;
use crate::kmeans::{KMeansConfig, kmeans};
use crate::preferences::preference_lists;

/// ClusterOutcome is the result of one clustering run.
pub struct ClusterOutcome {
    /// Cluster label in `[0, k)` per user.
    pub assignments: HashMap<i64, usize>,

    /// Ranked same-cluster peer lists, keyed by cluster label then user.
    /// Clusters with fewer than two members are absent.
    pub preferences: HashMap<usize, HashMap<i64, Vec<i64>>>,
}

/// Clusterer groups users by questionnaire similarity and derives ranked
/// preference lists within each group.
pub struct Clusterer {
    responses: Arc<dyn ResponseStore>,
    cfg: KMeansConfig,
}

impl Clusterer {
    pub fn new(responses: Arc<dyn ResponseStore>) -> Self {
        Self::with_config(responses, KMeansConfig::default())
    }

    pub fn with_config(responses: Arc<dyn ResponseStore>, mut cfg: KMeansConfig) -> Self {
        cfg.set_defaults();
        Self { responses, cfg }
    }

    /// Cluster every user's latest filled vector into `k` groups and build
    /// per-cluster preference lists. `k` of 0 means the configured
    /// default. Returns `Ok(None)` when no response data exists.
    pub async fn cluster_preferences(
        &self,
        k: usize,
    ) -> Result<Option<ClusterOutcome>, ClusterError> {
        let responses = self.responses.all_latest().await?;
        if responses.is_empty() {
            return Ok(None);
        }

        let vectors: Vec<ResponseVector> =
            responses.iter().map(|r| r.to_vector()).collect();
        let points: Vec<&[f32]> = vectors.iter().map(|v| v.as_slice()).collect();

        let cfg = KMeansConfig {
            k: if k == 0 { self.cfg.k } else { k },
            ..self.cfg.clone()
        };
        let labels = kmeans(&points, &cfg)?;

        let mut assignments = HashMap::with_capacity(vectors.len());
        let mut clusters: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, v) in vectors.iter().enumerate() {
            assignments.insert(v.user_id, labels[i]);
            clusters.entry(labels[i]).or_default().push(i);
        }

        let mut preferences = HashMap::new();
        for (label, member_idx) in clusters {
            if member_idx.len() < 2 {
                continue;
            }
            let members: Vec<(i64, &[f32])> = member_idx
                .iter()
                .map(|&i| (vectors[i].user_id, vectors[i].as_slice()))
                .collect();
            preferences.insert(label, preference_lists(&members)?);
        }

        Ok(Some(ClusterOutcome {
            assignments,
            preferences,
        }))
    }
}

#[cfg(test)]
mod tests {
    use bunkmate_survey::{MemoryResponseStore, QUESTION_COUNT, RawResponse};

    use super::*;

    /// Two opposed preference profiles: high on the first half of the
    /// questionnaire or high on the second half.
    fn profile(user_id: i64, high_first_half: bool) -> RawResponse {
        let mut answers = [None; QUESTION_COUNT];
        for (q, slot) in answers.iter_mut().enumerate() {
            let high = (q < QUESTION_COUNT / 2) == high_first_half;
            // Small per-user wobble keeps members distinct.
            let base = if high { 6 } else { 2 };
            *slot = Some(base + (user_id % 2) as u8);
        }
        RawResponse::new(user_id, answers)
    }

    #[tokio::test]
    async fn test_empty_store() {
        let clusterer = Clusterer::new(Arc::new(MemoryResponseStore::new()));
        assert!(clusterer.cluster_preferences(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_two_groups_with_preferences() {
        let store = Arc::new(MemoryResponseStore::new());
        for id in 1..=3 {
            store.add(profile(id, true));
        }
        for id in 4..=6 {
            store.add(profile(id, false));
        }

        let clusterer = Clusterer::new(store);
        let outcome = clusterer.cluster_preferences(2).await.unwrap().unwrap();

        assert_eq!(outcome.assignments.len(), 6);
        let first = outcome.assignments[&1];
        assert_eq!(outcome.assignments[&2], first);
        assert_eq!(outcome.assignments[&3], first);
        let second = outcome.assignments[&4];
        assert_ne!(first, second);
        assert_eq!(outcome.assignments[&5], second);
        assert_eq!(outcome.assignments[&6], second);

        assert_eq!(outcome.preferences.len(), 2);
        for (label, lists) in &outcome.preferences {
            for (user, peers) in lists {
                assert_eq!(peers.len(), 2, "cluster {label} user {user}");
                assert!(peers.iter().all(|p| p != user));
                assert!(
                    peers
                        .iter()
                        .all(|p| outcome.assignments[p] == *label),
                    "peer outside cluster"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_singleton_clusters_have_no_lists() {
        let store = Arc::new(MemoryResponseStore::new());
        store.add(profile(1, true));
        store.add(profile(2, false));
        store.add(profile(3, true));

        // k == n forces three singleton clusters.
        let clusterer = Clusterer::new(store);
        let outcome = clusterer.cluster_preferences(3).await.unwrap().unwrap();

        assert_eq!(outcome.assignments.len(), 3);
        assert!(outcome.preferences.is_empty());
    }

    #[tokio::test]
    async fn test_zero_k_uses_default() {
        let store = Arc::new(MemoryResponseStore::new());
        for id in 1..=5 {
            store.add(profile(id, id % 2 == 0));
        }
        let clusterer = Clusterer::new(store);
        let outcome = clusterer.cluster_preferences(0).await.unwrap().unwrap();

        let max_label = outcome.assignments.values().max().copied().unwrap();
        assert!(max_label < 3, "default k is 3");
    }
}
