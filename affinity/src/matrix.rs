use std::collections::HashMap;

use crate::cosine::cosine_similarity;
use crate::error::AffinityError;

/// Candidate is one entry in a user's ranked candidate list.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub user_id: i64,
    pub score: f32,
}

/// SimilarityMatrix is the dense pairwise cosine-similarity matrix over a
/// set of user vectors.
///
/// The matrix is symmetric. Self-similarity entries are forced to negative
/// infinity so no ranking ever selects a user as their own candidate.
pub struct SimilarityMatrix {
    /// User ids in ascending order; row/column i belongs to `ids[i]`.
    ids: Vec<i64>,
    index: HashMap<i64, usize>,
    /// Row-major n*n scores.
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build the matrix from (user id, vector) entries.
    ///
    /// All vectors must share one dimension and ids must be unique. The
    /// upper triangle is computed once and mirrored, so the matrix is
    /// symmetric bit for bit.
    pub fn build(entries: &[(i64, &[f32])]) -> Result<Self, AffinityError> {
        let want = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (_, v) in entries {
            if v.len() != want {
                return Err(AffinityError::DimensionMismatch {
                    got: v.len(),
                    want,
                });
            }
        }

        let mut sorted: Vec<(i64, &[f32])> = entries.to_vec();
        sorted.sort_by_key(|(id, _)| *id);

        let mut index = HashMap::with_capacity(sorted.len());
        for (i, (id, _)) in sorted.iter().enumerate() {
            if index.insert(*id, i).is_some() {
                return Err(AffinityError::DuplicateUser(*id));
            }
        }

        let n = sorted.len();
        let mut scores = vec![0.0f32; n * n];
        for i in 0..n {
            scores[i * n + i] = f32::NEG_INFINITY;
            for j in (i + 1)..n {
                let s = cosine_similarity(sorted[i].1, sorted[j].1);
                scores[i * n + j] = s;
                scores[j * n + i] = s;
            }
        }

        Ok(Self {
            ids: sorted.into_iter().map(|(id, _)| id).collect(),
            index,
            scores,
        })
    }

    /// Number of users in the matrix.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// User ids in ascending order.
    pub fn users(&self) -> &[i64] {
        &self.ids
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.index.contains_key(&user_id)
    }

    /// Similarity between two users. `None` if either is unknown.
    /// `score(u, u)` is negative infinity.
    pub fn score(&self, a: i64, b: i64) -> Option<f32> {
        let i = *self.index.get(&a)?;
        let j = *self.index.get(&b)?;
        Some(self.scores[i * self.ids.len() + j])
    }

    /// All other users ranked by descending similarity to `user`, ties
    /// broken by ascending user id. `None` if the user is unknown.
    pub fn ranked(&self, user: i64) -> Option<Vec<Candidate>> {
        let i = *self.index.get(&user)?;
        let n = self.ids.len();

        let mut out: Vec<Candidate> = (0..n)
            .filter(|&j| j != i)
            .map(|j| Candidate {
                user_id: self.ids[j],
                score: self.scores[i * n + j],
            })
            .collect();

        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.user_id.cmp(&b.user_id))
        });
        Some(out)
    }

    /// Position of `target` in `owner`'s ranking, without sorting: the
    /// number of peers that rank strictly higher, counting equal scores
    /// with a smaller id as higher (the same tiebreak `ranked` uses).
    pub fn rank_within(&self, owner: i64, target: i64) -> Option<usize> {
        let i = *self.index.get(&owner)?;
        let j = *self.index.get(&target)?;
        if i == j {
            return None;
        }

        let n = self.ids.len();
        let target_score = self.scores[i * n + j];
        let mut rank = 0;
        for k in 0..n {
            if k == i || k == j {
                continue;
            }
            let s = self.scores[i * n + k];
            if s > target_score || (s == target_score && self.ids[k] < target) {
                rank += 1;
            }
        }
        Some(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(entries: &[(i64, &[f32])]) -> SimilarityMatrix {
        SimilarityMatrix::build(entries).unwrap()
    }

    #[test]
    fn test_symmetric() {
        let m = build(&[
            (1, &[1.0, 2.0, 3.0]),
            (2, &[3.0, 1.0, 2.0]),
            (3, &[2.0, 3.0, 1.0]),
        ]);
        for &a in m.users() {
            for &b in m.users() {
                assert_eq!(m.score(a, b), m.score(b, a));
            }
        }
    }

    #[test]
    fn test_diagonal_suppressed() {
        let m = build(&[(1, &[1.0, 1.0]), (2, &[1.0, 0.0])]);
        assert_eq!(m.score(1, 1), Some(f32::NEG_INFINITY));
        assert_eq!(m.score(2, 2), Some(f32::NEG_INFINITY));
    }

    #[test]
    fn test_identical_vectors_rank_first() {
        let m = build(&[
            (1, &[5.0; 25]),
            (2, &[5.0; 25]),
            (3, &[1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0,
                  7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0, 7.0, 1.0]),
        ]);

        let s = m.score(1, 2).unwrap();
        assert!((s - 1.0).abs() < 1e-6, "identical all-5s: got {s}");

        let ranked = m.ranked(1).unwrap();
        assert_eq!(ranked[0].user_id, 2);
        let ranked = m.ranked(2).unwrap();
        assert_eq!(ranked[0].user_id, 1);
    }

    #[test]
    fn test_ranking_never_contains_self() {
        let m = build(&[
            (1, &[1.0, 0.0]),
            (2, &[0.0, 1.0]),
            (3, &[1.0, 1.0]),
        ]);
        for &u in m.users() {
            let ranked = m.ranked(u).unwrap();
            assert!(ranked.iter().all(|c| c.user_id != u));
            assert_eq!(ranked.len(), 2);
        }
    }

    #[test]
    fn test_ties_broken_by_ascending_id() {
        // Users 2 and 3 have identical vectors, so user 1 sees equal scores.
        let m = build(&[
            (1, &[1.0, 2.0]),
            (3, &[2.0, 1.0]),
            (2, &[2.0, 1.0]),
        ]);
        let ranked = m.ranked(1).unwrap();
        assert_eq!(ranked[0].user_id, 2);
        assert_eq!(ranked[1].user_id, 3);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn test_rank_within_matches_ranked() {
        let m = build(&[
            (1, &[1.0, 2.0, 3.0]),
            (2, &[3.0, 2.0, 1.0]),
            (3, &[1.0, 1.0, 1.0]),
            (4, &[2.0, 3.0, 1.0]),
        ]);
        for &u in m.users() {
            let ranked = m.ranked(u).unwrap();
            for (pos, c) in ranked.iter().enumerate() {
                assert_eq!(m.rank_within(u, c.user_id), Some(pos));
            }
        }
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let err = SimilarityMatrix::build(&[(1, &[1.0][..]), (1, &[2.0][..])]);
        assert!(matches!(err, Err(AffinityError::DuplicateUser(1))));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = SimilarityMatrix::build(&[(1, &[1.0, 2.0][..]), (2, &[1.0][..])]);
        assert!(matches!(
            err,
            Err(AffinityError::DimensionMismatch { got: 1, want: 2 })
        ));
    }

    #[test]
    fn test_empty_and_unknown() {
        let m = build(&[]);
        assert!(m.is_empty());
        assert!(m.ranked(1).is_none());
        assert!(m.score(1, 2).is_none());
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let m = build(&[(1, &[0.0, 0.0]), (2, &[1.0, 1.0])]);
        assert_eq!(m.score(1, 2), Some(0.0));
    }
}
