use tracing::debug;

use crate::matrix::{sq_dist, Matrix};

const MAX_ITERATIONS: usize = 100;
const MAX_CLUSTERS: usize = 20;

/// SplitMix64. Owned by this module so assignments stay bit-identical across
/// toolchain and dependency upgrades; cluster labels are user-visible and a
/// third-party RNG changing its stream would silently reshuffle them.
pub struct SplitMix64(u64);

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        SplitMix64(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    pub fn next_index(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Lloyd's algorithm over the rows of `features`. Returns one cluster index
/// per row. k is clamped to `min(k, rows, 20)`; same input and seed always
/// produce the same partition.
pub fn cluster(features: &Matrix, k: usize, seed: u64) -> Vec<usize> {
    let n = features.rows();
    if n == 0 {
        return Vec::new();
    }
    let k = k.min(n).min(MAX_CLUSTERS).max(1);
    let dims = features.cols();

    let mut rng = SplitMix64::new(seed);

    // seeded init: k distinct rows as starting centroids
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    while chosen.len() < k {
        let idx = rng.next_index(n);
        if !chosen.contains(&idx) {
            chosen.push(idx);
        }
    }
    let mut centroids: Vec<Vec<f64>> = chosen.iter().map(|&i| features.row(i).to_vec()).collect();

    let mut assignments = vec![0usize; n];
    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        for row in 0..n {
            let point = features.row(row);
            let mut best = 0usize;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = sq_dist(point, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            if assignments[row] != best {
                assignments[row] = best;
                changed = true;
            }
        }

        if !changed && iteration > 0 {
            debug!("k-means converged - iterations={}, k={}", iteration, k);
            break;
        }

        // recompute centroids as member means; empty clusters keep their
        // previous centroid rather than being reseeded
        let mut sums = vec![vec![0.0f64; dims]; k];
        let mut counts = vec![0usize; k];
        for row in 0..n {
            let c = assignments[row];
            counts[c] += 1;
            for (s, v) in sums[c].iter_mut().zip(features.row(row)) {
                *s += v;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for (cent, s) in centroids[c].iter_mut().zip(&sums[c]) {
                    *cent = s / counts[c] as f64;
                }
            }
        }
    }

    assignments
}
