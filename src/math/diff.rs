//! Central finite differences.
//!
//! Steps are scaled by `max(1, |x_i|)` so parameters of very different
//! magnitude (an equilibrium near 0.15 nm next to a force constant near 1e5)
//! are both resolved above rounding noise.
//!
//! Every stencil point is independent, so evaluations are spread over the
//! supplied worker pool. `collect` keeps index order, which keeps the result
//! independent of scheduling.

use nalgebra::DMatrix;
use rayon::ThreadPool;
use rayon::prelude::*;

/// Relative step for first derivatives.
pub const GRADIENT_STEP: f64 = 6e-6;
/// Relative step for second derivatives.
pub const HESSIAN_STEP: f64 = 1e-4;

fn scaled_step(base: f64, xi: f64) -> f64 {
    base * xi.abs().max(1.0)
}

/// Central-difference gradient of `f` at `x`.
pub fn central_gradient<F>(f: &F, x: &[f64], pool: &ThreadPool) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync + ?Sized,
{
    pool.install(|| {
        (0..x.len())
            .into_par_iter()
            .map(|i| {
                let h = scaled_step(GRADIENT_STEP, x[i]);
                let mut xp = x.to_vec();
                let mut xm = x.to_vec();
                xp[i] += h;
                xm[i] -= h;
                // Divide by the step actually representable in floating point.
                (f(&xp) - f(&xm)) / (xp[i] - xm[i])
            })
            .collect()
    })
}

/// Central-difference Hessian of `f` at `x` (symmetric).
pub fn central_hessian<F>(f: &F, x: &[f64], pool: &ThreadPool) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> f64 + Sync + ?Sized,
{
    let n = x.len();
    let f0 = f(x);
    let steps: Vec<f64> = x.iter().map(|&xi| scaled_step(HESSIAN_STEP, xi)).collect();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

    let shifted = |moves: &[(usize, f64)]| {
        let mut y = x.to_vec();
        for &(k, delta) in moves {
            y[k] += delta;
        }
        f(&y)
    };

    let values: Vec<f64> = pool.install(|| {
        pairs
            .par_iter()
            .map(|&(i, j)| {
                let hi = steps[i];
                if i == j {
                    (shifted(&[(i, hi)]) - 2.0 * f0 + shifted(&[(i, -hi)])) / (hi * hi)
                } else {
                    let hj = steps[j];
                    let pp = shifted(&[(i, hi), (j, hj)]);
                    let pm = shifted(&[(i, hi), (j, -hj)]);
                    let mp = shifted(&[(i, -hi), (j, hj)]);
                    let mm = shifted(&[(i, -hi), (j, -hj)]);
                    (pp - pm - mp + mm) / (4.0 * hi * hj)
                }
            })
            .collect()
    });

    let mut h = DMatrix::zeros(n, n);
    for (&(i, j), &v) in pairs.iter().zip(&values) {
        h[(i, j)] = v;
        h[(j, i)] = v;
    }
    h
}
