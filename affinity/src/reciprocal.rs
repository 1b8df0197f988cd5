use crate::matrix::{Candidate, SimilarityMatrix};

/// Compute a user's reciprocal candidate list.
///
/// Walks the user's ranking in descending score order and keeps candidate
/// `c` only if the user also sits within the first `window` entries of
/// `c`'s own independently ranked list. The result is truncated to
/// `window` entries.
///
/// Returns `None` if the user is not in the matrix. An empty list means
/// the user has no mutually ranked candidate; that is a valid outcome,
/// not an error.
pub fn reciprocal_candidates(
    matrix: &SimilarityMatrix,
    user: i64,
    window: usize,
) -> Option<Vec<Candidate>> {
    let ranked = matrix.ranked(user)?;

    let mut kept = Vec::new();
    for candidate in ranked {
        if kept.len() >= window {
            break;
        }
        match matrix.rank_within(candidate.user_id, user) {
            Some(rank) if rank < window => kept.push(candidate),
            _ => {}
        }
    }
    Some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(entries: &[(i64, &[f32])]) -> SimilarityMatrix {
        SimilarityMatrix::build(entries).unwrap()
    }

    #[test]
    fn test_mutual_top_candidates() {
        // 1 and 2 are near-identical; 3 is the odd one out.
        let m = build(&[
            (1, &[5.0, 5.0, 5.0, 5.0]),
            (2, &[5.0, 5.0, 5.0, 4.0]),
            (3, &[1.0, 7.0, 1.0, 7.0]),
        ]);

        let c1 = reciprocal_candidates(&m, 1, 1).unwrap();
        assert_eq!(c1[0].user_id, 2);
        let c2 = reciprocal_candidates(&m, 2, 1).unwrap();
        assert_eq!(c2[0].user_id, 1);
    }

    #[test]
    fn test_mutuality_is_enforced() {
        // A's top candidate is B, but B prefers C; under a top-1 window A
        // gets nothing, while top-2 readmits B.
        let a = [5.0, 5.0, 5.0, 1.0];
        let b = [5.0, 5.0, 4.0, 3.0];
        let c = [5.0, 5.0, 4.0, 3.5];
        let m = build(&[(1, &a), (2, &b), (3, &c)]);

        assert_eq!(m.ranked(1).unwrap()[0].user_id, 2, "A's top is B");
        assert_eq!(m.ranked(2).unwrap()[0].user_id, 3, "B's top is C");

        let strict = reciprocal_candidates(&m, 1, 1).unwrap();
        assert!(strict.is_empty(), "no mutual top-1 for A");

        let wide = reciprocal_candidates(&m, 1, 2).unwrap();
        assert!(wide.iter().any(|cand| cand.user_id == 2));
    }

    #[test]
    fn test_every_result_is_mutual() {
        let vectors: Vec<(i64, Vec<f32>)> = vec![
            (1, vec![5.0, 3.0, 1.0, 6.0]),
            (2, vec![4.0, 4.0, 2.0, 6.0]),
            (3, vec![1.0, 6.0, 7.0, 2.0]),
            (4, vec![2.0, 6.0, 6.0, 1.0]),
            (5, vec![4.0, 4.0, 4.0, 4.0]),
        ];
        let entries: Vec<(i64, &[f32])> =
            vectors.iter().map(|(id, v)| (*id, v.as_slice())).collect();
        let m = build(&entries);

        let window = 2;
        for &u in m.users() {
            for cand in reciprocal_candidates(&m, u, window).unwrap() {
                let rank = m.rank_within(cand.user_id, u).unwrap();
                assert!(
                    rank < window,
                    "user {u} kept {c} but ranks {rank} for them",
                    c = cand.user_id
                );
            }
        }
    }

    #[test]
    fn test_window_truncates() {
        let vectors: Vec<(i64, Vec<f32>)> = (1..=6)
            .map(|id| (id, vec![5.0, 5.0, 5.0, 5.0 + id as f32 * 0.01]))
            .collect();
        let entries: Vec<(i64, &[f32])> =
            vectors.iter().map(|(id, v)| (*id, v.as_slice())).collect();
        let m = build(&entries);

        let c = reciprocal_candidates(&m, 1, 3).unwrap();
        assert!(c.len() <= 3);
    }

    #[test]
    fn test_unknown_user() {
        let m = build(&[(1, &[1.0, 2.0]), (2, &[2.0, 1.0])]);
        assert!(reciprocal_candidates(&m, 9, 5).is_none());
    }

    #[test]
    fn test_scores_descend() {
        let m = build(&[
            (1, &[5.0, 4.0, 3.0]),
            (2, &[5.0, 4.0, 2.0]),
            (3, &[5.0, 3.0, 3.0]),
            (4, &[4.0, 4.0, 3.0]),
        ]);
        let c = reciprocal_candidates(&m, 1, 3).unwrap();
        for pair in c.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
