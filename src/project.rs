use tracing::debug;

use crate::config::Viewport;
use crate::matrix::{dot, Matrix};

const POWER_ITERATIONS: usize = 100;
const CONVERGENCE_EPS: f64 = 1e-9;

/// Project every row of `features` onto its top-2 principal components.
/// Component sign and orientation are not canonical; callers may rely only
/// on relative distances, which is all the layout needs.
pub fn pca_2d(features: &Matrix) -> Vec<[f64; 2]> {
    let n = features.rows();
    if n == 0 {
        return Vec::new();
    }
    let dims = features.cols();
    if dims == 0 {
        return vec![[0.0, 0.0]; n];
    }

    // mean-center a working copy
    let mean = features.mean_row();
    let mut centered = features.clone();
    for r in 0..n {
        for (v, m) in centered.row_mut(r).iter_mut().zip(&mean) {
            *v -= m;
        }
    }

    let first = principal_component(&centered, None);
    let second = principal_component(&centered, Some(&first));

    (0..n)
        .map(|r| {
            let row = centered.row(r);
            [dot(row, &first), dot(row, &second)]
        })
        .collect()
}

/// Dominant eigenvector of the covariance operator by power iteration,
/// using matrix-free products (w = Xᵀ(Xv)) so the dims×dims covariance
/// matrix is never materialized. `deflate` removes an already-found
/// component, yielding the next one. Fixed start vector keeps runs
/// bit-for-bit reproducible.
fn principal_component(centered: &Matrix, deflate: Option<&[f64]>) -> Vec<f64> {
    let n = centered.rows();
    let dims = centered.cols();

    let mut v: Vec<f64> = (0..dims).map(|j| 1.0 + (j % 7) as f64 * 0.1).collect();
    project_out(&mut v, deflate);
    if !normalize(&mut v) {
        return v;
    }

    for _ in 0..POWER_ITERATIONS {
        let mut w = vec![0.0f64; dims];
        for r in 0..n {
            let row = centered.row(r);
            let s = dot(row, &v);
            for (wj, xj) in w.iter_mut().zip(row) {
                *wj += s * xj;
            }
        }
        project_out(&mut w, deflate);
        if !normalize(&mut w) {
            // no variance along any remaining direction
            return w;
        }
        let drift: f64 = v.iter().zip(&w).map(|(a, b)| (a - b).abs()).sum();
        v = w;
        if drift < CONVERGENCE_EPS {
            break;
        }
    }
    v
}

fn project_out(v: &mut [f64], direction: Option<&[f64]>) {
    if let Some(d) = direction {
        let s = dot(v, d);
        for (vj, dj) in v.iter_mut().zip(d) {
            *vj -= s * dj;
        }
    }
}

/// Normalize in place; false if the vector is (numerically) zero.
fn normalize(v: &mut [f64]) -> bool {
    let norm = dot(v, v).sqrt();
    if norm < 1e-12 {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

/// Linearly map the point set's bounding box onto the viewport, each axis
/// independently. A zero-range axis uses divisor 1, parking every point at
/// that axis's minimum edge instead of producing NaN.
pub fn scale_to_viewport(points: &[[f64; 2]], vp: Viewport) -> Vec<[f64; 2]> {
    if points.is_empty() {
        return Vec::new();
    }
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p[0]);
        max_x = max_x.max(p[0]);
        min_y = min_y.min(p[1]);
        max_y = max_y.max(p[1]);
    }
    let range_x = if max_x - min_x > 0.0 { max_x - min_x } else { 1.0 };
    let range_y = if max_y - min_y > 0.0 { max_y - min_y } else { 1.0 };

    debug!(
        "Viewport scaling - raw_x=[{:.3},{:.3}], raw_y=[{:.3},{:.3}]",
        min_x, max_x, min_y, max_y
    );

    points
        .iter()
        .map(|p| {
            [
                vp.x_min + (p[0] - min_x) / range_x * (vp.x_max - vp.x_min),
                vp.y_min + (p[1] - min_y) / range_y * (vp.y_max - vp.y_min),
            ]
        })
        .collect()
}
