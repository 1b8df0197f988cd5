use crate::error::AffinityError;
use crate::matrix::SimilarityMatrix;

/// Assignment is the result of solving a minimum-cost assignment problem.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Disjoint (row, column) pairs: no two pairs share a row or a column.
    /// Sorted by row.
    pub pairs: Vec<(usize, usize)>,

    /// Sum of the input costs over `pairs`.
    pub total_cost: f64,
}

/// Solve the minimum-cost assignment problem for a square cost matrix.
///
/// Uses the Hungarian algorithm with row/column potentials (shortest
/// augmenting paths), O(n^3). `f64::INFINITY` entries mark forbidden
/// pairs: the solver assigns as many rows as the finite entries allow and
/// drops forbidden pairs from the result, so the matching may be partial.
/// Among assignments of that maximum feasible size, total cost is minimal.
pub fn assign(cost: &[Vec<f64>]) -> Result<Assignment, AffinityError> {
    let n = cost.len();
    for (row, r) in cost.iter().enumerate() {
        if r.len() != n {
            return Err(AffinityError::NotSquare {
                row,
                got: r.len(),
                want: n,
            });
        }
    }
    if n == 0 {
        return Ok(Assignment {
            pairs: Vec::new(),
            total_cost: 0.0,
        });
    }

    // Forbidden entries become a finite sentinel larger than any possible
    // difference between two assignments' true costs, so the solver first
    // minimizes the number of forbidden pairs used and then the true cost.
    let max_abs = cost
        .iter()
        .flatten()
        .filter(|c| c.is_finite())
        .fold(0.0f64, |m, &c| m.max(c.abs()));
    let big = 2.0 * n as f64 * (max_abs + 1.0) + 1.0;

    let a: Vec<Vec<f64>> = cost
        .iter()
        .map(|r| r.iter().map(|&c| if c.is_finite() { c } else { big }).collect())
        .collect();

    // Potentials over 1-indexed rows (u) and columns (v); p[j] is the row
    // matched to column j, p[0] the row currently being inserted.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = a[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Unwind the augmenting path.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs = Vec::with_capacity(n);
    let mut total_cost = 0.0;
    for j in 1..=n {
        let i = p[j];
        if i == 0 {
            continue;
        }
        let c = cost[i - 1][j - 1];
        if c.is_finite() {
            pairs.push((i - 1, j - 1));
            total_cost += c;
        }
    }
    pairs.sort_unstable();

    Ok(Assignment { pairs, total_cost })
}

/// Match users one-to-one by globally optimal assignment over negated
/// similarity. Self-pairs are forbidden via the matrix's suppressed
/// diagonal. Returns (user, assigned peer, similarity) per assigned user,
/// sorted by user id.
///
/// The mapping is one-to-one in both directions but not necessarily
/// mutual: the optimum may contain cycles longer than two.
pub fn match_by_assignment(
    matrix: &SimilarityMatrix,
) -> Result<Vec<(i64, i64, f32)>, AffinityError> {
    let ids = matrix.users();
    let n = ids.len();

    let cost: Vec<Vec<f64>> = ids
        .iter()
        .map(|&a| {
            ids.iter()
                // score(a, a) is -inf, so the diagonal becomes +inf.
                .map(|&b| -(matrix.score(a, b).unwrap() as f64))
                .collect()
        })
        .collect();

    let assignment = assign(&cost)?;

    let mut out = Vec::with_capacity(assignment.pairs.len());
    for (r, c) in assignment.pairs {
        let user = ids[r];
        let peer = ids[c];
        out.push((user, peer, matrix.score(user, peer).unwrap()));
    }
    out.sort_unstable_by_key(|(user, _, _)| *user);
    Ok(out)
}
