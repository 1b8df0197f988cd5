use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use bunkmate_affinity::{SimilarityMatrix, reciprocal_candidates};
use bunkmate_survey::{ResponseStore, ResponseVector};

use crate::error::PairingError;
use crate::store::MatchStore;
use crate::types::{BestMatch, MatchRecord, PairKey, RoundOutcome};

/// Configures a [Matchmaker].
#[derive(Debug, Clone)]
pub struct MatchmakerConfig {
    /// Reciprocity window for user-facing best-match queries (default: 5).
    pub result_window: usize,

    /// Reciprocity window used inside pairing rounds (default: 10).
    pub round_window: usize,

    /// Maximum number of pairing rounds per run (default: 10). A safety
    /// bound, not an expected steady state.
    pub round_cap: usize,
}

impl Default for MatchmakerConfig {
    fn default() -> Self {
        Self {
            result_window: 5,
            round_window: 10,
            round_cap: 10,
        }
    }
}

impl MatchmakerConfig {
    fn set_defaults(&mut self) {
        let d = Self::default();
        if self.result_window == 0 {
            self.result_window = d.result_window;
        }
        if self.round_window == 0 {
            self.round_window = d.round_window;
        }
        if self.round_cap == 0 {
            self.round_cap = d.round_cap;
        }
    }
}

/// Matchmaker computes roommate compatibility and drives the multi-round
/// pairing process over caller-provided stores.
pub struct Matchmaker {
    responses: Arc<dyn ResponseStore>,
    matches: Arc<dyn MatchStore>,
    cfg: MatchmakerConfig,
}

impl Matchmaker {
    pub fn new(responses: Arc<dyn ResponseStore>, matches: Arc<dyn MatchStore>) -> Self {
        Self::with_config(responses, matches, MatchmakerConfig::default())
    }

    pub fn with_config(
        responses: Arc<dyn ResponseStore>,
        matches: Arc<dyn MatchStore>,
        mut cfg: MatchmakerConfig,
    ) -> Self {
        cfg.set_defaults();
        Self {
            responses,
            matches,
            cfg,
        }
    }

    /// Return the user's best reciprocal matches, strongest first.
    ///
    /// `top_n` bounds the result and the reciprocity window; 0 means the
    /// configured `result_window`. Returns `Ok(None)` when no response
    /// data exists for the user (or for anyone); an empty list means the
    /// user has no mutually ranked candidate right now.
    pub async fn best_matches(
        &self,
        user_id: i64,
        top_n: usize,
    ) -> Result<Option<Vec<BestMatch>>, PairingError> {
        let window = if top_n == 0 {
            self.cfg.result_window
        } else {
            top_n
        };

        let vectors: Vec<ResponseVector> = self
            .responses
            .all_latest()
            .await?
            .iter()
            .map(|r| r.to_vector())
            .collect();

        let entries: Vec<(i64, &[f32])> = vectors
            .iter()
            .map(|v| (v.user_id, v.as_slice()))
            .collect();
        let matrix = SimilarityMatrix::build(&entries)?;

        let Some(candidates) = reciprocal_candidates(&matrix, user_id, window) else {
            return Ok(None);
        };

        Ok(Some(
            candidates
                .into_iter()
                .map(|c| BestMatch {
                    peer_id: c.user_id,
                    score: c.score,
                })
                .collect(),
        ))
    }

    /// Run the multi-round pairing process.
    ///
    /// Loads every recorded pair as an exclusion set and the pool of users
    /// whose derived matched status is false, then pairs round by round:
    /// each round ranks the remaining pool, walks users in ascending id
    /// order, and accepts each user's best still-available reciprocal
    /// candidate whose pair is not excluded. Accepted pairs are committed
    /// in one batch per round and their users leave the pool for the rest
    /// of the run. Stops when a round accepts nothing or the round cap is
    /// reached.
    pub async fn run_rounds(&self) -> Result<RoundOutcome, PairingError> {
        let mut excluded = self.matches.existing_pairs().await?;

        let mut pool: Vec<ResponseVector> = Vec::new();
        for response in self.responses.all_latest().await? {
            if !self.matches.is_matched(response.user_id).await? {
                pool.push(response.to_vector());
            }
        }

        if pool.len() < 2 {
            return Ok(RoundOutcome::Insufficient {
                available: pool.len(),
            });
        }

        let mut committed: Vec<MatchRecord> = Vec::new();
        let mut rounds = 0usize;
        let mut capped = false;

        for round in 1..=self.cfg.round_cap {
            if pool.len() < 2 {
                break;
            }

            let entries: Vec<(i64, &[f32])> = pool
                .iter()
                .map(|v| (v.user_id, v.as_slice()))
                .collect();
            let matrix = SimilarityMatrix::build(&entries)?;

            let accepted = select_pairs(&matrix, self.cfg.round_window, &mut excluded);
            debug!(
                round,
                pool = pool.len(),
                accepted = accepted.len(),
                "pairing round"
            );
            if accepted.is_empty() {
                break;
            }

            let now = Utc::now();
            let records: Vec<MatchRecord> = accepted
                .iter()
                .map(|&(user_id, peer_id, score)| MatchRecord {
                    user_id,
                    peer_id,
                    score,
                    created_at: now,
                })
                .collect();
            self.matches.commit(&records).await?;

            let paired: HashSet<i64> = accepted
                .iter()
                .flat_map(|&(a, b, _)| [a, b])
                .collect();
            pool.retain(|v| !paired.contains(&v.user_id));

            committed.extend(records);
            rounds = round;
            if round == self.cfg.round_cap {
                capped = true;
            }
        }

        info!(
            pairs = committed.len(),
            rounds, capped, "matching run finished"
        );
        Ok(RoundOutcome::Completed {
            pairs: committed,
            rounds,
            capped,
        })
    }
}

/// One round of greedy reciprocal selection over the round's matrix.
///
/// Walks users in ascending id order; each still-available user accepts
/// its highest-ranked reciprocal candidate that is still available and
/// whose pair is not excluded. Accepted pairs go into `excluded`
/// immediately so later users in the same round cannot re-claim them.
fn select_pairs(
    matrix: &SimilarityMatrix,
    window: usize,
    excluded: &mut HashSet<PairKey>,
) -> Vec<(i64, i64, f32)> {
    let mut available: HashSet<i64> = matrix.users().iter().copied().collect();
    let mut accepted = Vec::new();

    for &user in matrix.users() {
        if !available.contains(&user) {
            continue;
        }
        let Some(candidates) = reciprocal_candidates(matrix, user, window) else {
            continue;
        };

        for cand in candidates {
            if cand.user_id == user || !available.contains(&cand.user_id) {
                continue;
            }
            let key = PairKey::new(user, cand.user_id);
            if excluded.contains(&key) {
                continue;
            }

            available.remove(&user);
            available.remove(&cand.user_id);
            excluded.insert(key);
            accepted.push((user, cand.user_id, cand.score));
            break;
        }
    }

    accepted
}
