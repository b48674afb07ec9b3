use std::collections::HashMap;

use tracing::{debug, warn};

/// Enforce the minimum cluster size on 2D positions. Any cluster with
/// `0 < size < min_size` has all its members reassigned to the nearest
/// other cluster by squared distance between centroids, repeatedly, until
/// nothing violates the threshold. Ids are then renumbered densely from 0
/// in order of first appearance. Returns the final cluster count.
///
/// Degenerate case: if every cluster is undersized at once, everything
/// collapses into the largest one (a single cluster may then stay below the
/// threshold only when the corpus itself is smaller than it).
pub fn enforce_min_size(
    assignments: &mut [usize],
    points: &[[f64; 2]],
    min_size: usize,
) -> usize {
    assert_eq!(assignments.len(), points.len(), "assignment/position length mismatch");

    loop {
        let sizes = cluster_sizes(assignments);
        if sizes.len() <= 1 {
            break;
        }

        // smallest violator first; id breaks ties so the walk is deterministic
        let violator = sizes
            .iter()
            .filter(|(_, &s)| s < min_size)
            .min_by_key(|(&id, &s)| (s, id))
            .map(|(&id, _)| id);
        let Some(small) = violator else { break };

        if sizes.values().all(|&s| s < min_size) {
            let (&largest, _) = sizes
                .iter()
                .max_by_key(|(&id, &s)| (s, std::cmp::Reverse(id)))
                .expect("at least two clusters");
            warn!(
                "All {} clusters below min_size={}; collapsing into cluster {}",
                sizes.len(),
                min_size,
                largest
            );
            for a in assignments.iter_mut() {
                *a = largest;
            }
            break;
        }

        let centroids = cluster_centroids(assignments, points);
        let small_centroid = centroids[&small];
        let target = centroids
            .iter()
            .filter(|(&id, _)| id != small)
            .min_by(|(ia, a), (ib, b)| {
                let da = sq_dist_2d(small_centroid, **a);
                let db = sq_dist_2d(small_centroid, **b);
                da.partial_cmp(&db)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ia.cmp(ib))
            })
            .map(|(&id, _)| id)
            .expect("at least one merge target");

        debug!(
            "Merging small cluster - id={}, size={}, target={}",
            small, sizes[&small], target
        );
        for a in assignments.iter_mut() {
            if *a == small {
                *a = target;
            }
        }
    }

    renumber_dense(assignments)
}

/// Remap cluster ids onto `0..k'` in order of first appearance.
fn renumber_dense(assignments: &mut [usize]) -> usize {
    let mut remap: HashMap<usize, usize> = HashMap::new();
    for a in assignments.iter_mut() {
        let next = remap.len();
        let dense = *remap.entry(*a).or_insert(next);
        *a = dense;
    }
    remap.len()
}

fn cluster_sizes(assignments: &[usize]) -> HashMap<usize, usize> {
    let mut sizes = HashMap::new();
    for &a in assignments {
        *sizes.entry(a).or_insert(0) += 1;
    }
    sizes
}

fn cluster_centroids(assignments: &[usize], points: &[[f64; 2]]) -> HashMap<usize, [f64; 2]> {
    let mut sums: HashMap<usize, ([f64; 2], usize)> = HashMap::new();
    for (&a, p) in assignments.iter().zip(points) {
        let entry = sums.entry(a).or_insert(([0.0, 0.0], 0));
        entry.0[0] += p[0];
        entry.0[1] += p[1];
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(id, (sum, n))| (id, [sum[0] / n as f64, sum[1] / n as f64]))
        .collect()
}

fn sq_dist_2d(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}
