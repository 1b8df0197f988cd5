use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ClusterError;

/// KMeansConfig configures a clustering run.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters. Must satisfy `1 <= k <= points`.
    pub k: usize,
    /// Maximum Lloyd iterations per restart. Default: 100.
    pub max_iters: usize,
    /// Number of restarts; the run with the lowest inertia wins.
    /// Default: 10.
    pub n_init: usize,
    /// RNG seed. A fixed seed makes the clustering reproducible.
    /// Default: 42.
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iters: 100,
            n_init: 10,
            seed: 42,
        }
    }
}

impl KMeansConfig {
    pub(crate) fn set_defaults(&mut self) {
        let d = Self::default();
        if self.max_iters == 0 {
            self.max_iters = d.max_iters;
        }
        if self.n_init == 0 {
            self.n_init = d.n_init;
        }
    }
}

/// Partition points into `cfg.k` clusters with Lloyd's algorithm.
///
/// Distance is squared Euclidean on the raw vectors. Initialization is
/// k-means++, restarted `cfg.n_init` times; the restart with the lowest
/// inertia wins. Deterministic for a fixed seed.
///
/// Returns one cluster label in `[0, k)` per point, in input order.
pub fn kmeans(points: &[&[f32]], cfg: &KMeansConfig) -> Result<Vec<usize>, ClusterError> {
    let n = points.len();
    if cfg.k == 0 || cfg.k > n {
        return Err(ClusterError::BadClusterCount { k: cfg.k, n });
    }
    let dim = points[0].len();
    for p in points {
        if p.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                got: p.len(),
                want: dim,
            });
        }
    }

    let mut cfg = cfg.clone();
    cfg.set_defaults();

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut best_labels = Vec::new();
    let mut best_inertia = f64::INFINITY;

    for _ in 0..cfg.n_init {
        let (labels, inertia) = run_once(points, cfg.k, cfg.max_iters, &mut rng);
        if inertia < best_inertia {
            best_inertia = inertia;
            best_labels = labels;
        }
    }
    Ok(best_labels)
}

fn run_once(
    points: &[&[f32]],
    k: usize,
    max_iters: usize,
    rng: &mut StdRng,
) -> (Vec<usize>, f64) {
    let n = points.len();
    let dim = points[0].len();
    let mut centroids = init_plus_plus(points, k, rng);
    let mut labels = vec![0usize; n];

    for _ in 0..max_iters {
        let mut changed = false;

        // Assignment step: nearest centroid, lowest index on ties.
        for (i, p) in points.iter().enumerate() {
            let nearest = nearest_centroid(p, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        // Update step.
        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (i, p) in points.iter().enumerate() {
            counts[labels[i]] += 1;
            for (d, &v) in p.iter().enumerate() {
                sums[labels[i]][d] += v as f64;
            }
        }
        for c in 0..k {
            if counts[c] == 0 {
                // Re-seed an empty cluster with the point farthest from
                // its assigned centroid.
                let far = farthest_point(points, &labels, &centroids);
                centroids[c] = points[far].iter().map(|&v| v as f64).collect();
                labels[far] = c;
                changed = true;
            } else {
                for d in 0..dim {
                    centroids[c][d] = sums[c][d] / counts[c] as f64;
                }
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = points
        .iter()
        .enumerate()
        .map(|(i, p)| dist2(p, &centroids[labels[i]]))
        .sum();
    (labels, inertia)
}

/// k-means++ seeding: later centroids are sampled with probability
/// proportional to squared distance from the nearest chosen centroid.
fn init_plus_plus(points: &[&[f32]], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);

    let first = rng.gen_range(0..n);
    centroids.push(points[first].iter().map(|&v| v as f64).collect());

    let mut d2 = vec![0.0f64; n];
    while centroids.len() < k {
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            d2[i] = centroids
                .iter()
                .map(|c| dist2(p, c))
                .fold(f64::INFINITY, f64::min);
            total += d2[i];
        }

        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = None;
            for (i, &d) in d2.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                target -= d;
                if target <= 0.0 {
                    chosen = Some(i);
                    break;
                }
            }
            // Fall back to the last positive-weight point if rounding
            // left the walk short.
            chosen.unwrap_or_else(|| {
                d2.iter().rposition(|&d| d > 0.0).unwrap_or(n - 1)
            })
        } else {
            // All points coincide with a centroid; any pick works.
            rng.gen_range(0..n)
        };
        centroids.push(points[next].iter().map(|&v| v as f64).collect());
    }
    centroids
}

fn nearest_centroid(p: &[f32], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = dist2(p, centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn farthest_point(points: &[&[f32]], labels: &[usize], centroids: &[Vec<f64>]) -> usize {
    let mut far = 0;
    let mut far_d = -1.0f64;
    for (i, p) in points.iter().enumerate() {
        let d = dist2(p, &centroids[labels[i]]);
        if d > far_d {
            far_d = d;
            far = i;
        }
    }
    far
}

fn dist2(p: &[f32], c: &[f64]) -> f64 {
    p.iter()
        .zip(c.iter())
        .map(|(&a, &b)| {
            let diff = a as f64 - b;
            diff * diff
        })
        .sum()
}
