use std::collections::HashMap;

use bunkmate_affinity::SimilarityMatrix;

use crate::error::ClusterError;

/// Build ranked preference lists for one cluster's members.
///
/// Every member gets the full list of same-cluster peers ordered by
/// descending cosine similarity (ties by ascending id, self excluded).
/// Callers skip clusters with fewer than two members; a single member
/// would have nobody to rank.
pub fn preference_lists(
    members: &[(i64, &[f32])],
) -> Result<HashMap<i64, Vec<i64>>, ClusterError> {
    let matrix = SimilarityMatrix::build(members)?;

    let mut lists = HashMap::with_capacity(members.len());
    for &user in matrix.users() {
        if let Some(ranked) = matrix.ranked(user) {
            lists.insert(user, ranked.into_iter().map(|c| c.user_id).collect());
        }
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_by_similarity() {
        let members: Vec<(i64, &[f32])> = vec![
            (1, &[5.0, 5.0, 5.0]),
            (2, &[5.0, 5.0, 4.0]),
            (3, &[1.0, 7.0, 2.0]),
        ];
        let lists = preference_lists(&members).unwrap();

        assert_eq!(lists[&1], vec![2, 3]);
        assert_eq!(lists[&2], vec![1, 3]);
        assert_eq!(lists.len(), 3);
    }

    #[test]
    fn test_self_excluded_and_complete() {
        let members: Vec<(i64, &[f32])> = vec![
            (10, &[1.0, 2.0]),
            (20, &[2.0, 1.0]),
            (30, &[1.0, 1.0]),
            (40, &[3.0, 1.0]),
        ];
        let lists = preference_lists(&members).unwrap();

        for (&user, peers) in &lists {
            assert_eq!(peers.len(), members.len() - 1);
            assert!(peers.iter().all(|&p| p != user));
        }
    }

    #[test]
    fn test_pair_cluster() {
        let members: Vec<(i64, &[f32])> = vec![(1, &[1.0, 0.0]), (2, &[0.0, 1.0])];
        let lists = preference_lists(&members).unwrap();
        assert_eq!(lists[&1], vec![2]);
        assert_eq!(lists[&2], vec![1]);
    }
}
