//! Newton minimizer with Hessian modification and backtracking line search.
//!
//! Each iteration:
//! - builds the finite-difference Hessian `H`
//! - solves `(H + τI) d = −g` by Cholesky, raising `τ` until `H + τI` is
//!   positive definite
//! - backtracks `x + α·d` from `α = 1` until the Armijo condition holds with a
//!   strict decrease
//!
//! Convergence is declared when `‖g‖∞` drops below the gradient threshold, or
//! (when enabled) when the objective stopped improving by more than an absolute
//! amount for `window` consecutive iterations.

use nalgebra::{DMatrix, DVector};
use rayon::ThreadPool;
use tracing::trace;

use crate::error::MinimizeError;
use crate::math::diff::{central_gradient, central_hessian};

const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;
const MAX_SHIFTS: usize = 60;

type ValueFn<'a> = dyn Fn(&[f64]) -> f64 + Sync + 'a;
type GradientFn<'a> = dyn Fn(&[f64]) -> Vec<f64> + Sync + 'a;

/// Scalar objective with an optional closed-form gradient.
pub struct Objective<'a> {
    value: Box<ValueFn<'a>>,
    gradient: Option<Box<GradientFn<'a>>>,
}

impl<'a> Objective<'a> {
    pub fn new(value: impl Fn(&[f64]) -> f64 + Sync + 'a) -> Self {
        Self {
            value: Box::new(value),
            gradient: None,
        }
    }

    /// Use `gradient` instead of finite differences for first derivatives.
    pub fn with_gradient(mut self, gradient: impl Fn(&[f64]) -> Vec<f64> + Sync + 'a) -> Self {
        self.gradient = Some(Box::new(gradient));
        self
    }

    pub fn value(&self, x: &[f64]) -> f64 {
        (self.value)(x)
    }

    pub fn gradient(&self, x: &[f64], pool: &ThreadPool) -> Vec<f64> {
        match &self.gradient {
            Some(g) => g(x),
            None => central_gradient(self.value.as_ref(), x, pool),
        }
    }

    pub fn hessian(&self, x: &[f64], pool: &ThreadPool) -> DMatrix<f64> {
        central_hessian(self.value.as_ref(), x, pool)
    }
}

/// Stall criterion on the objective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionConverge {
    /// Improvement of the best value that resets the stall counter.
    pub absolute: f64,
    /// Consecutive non-improving iterations that count as converged.
    pub window: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub gradient_threshold: f64,
    pub function_converge: Option<FunctionConverge>,
    pub max_iterations: u64,
}

/// A converged minimizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub f: f64,
    pub iterations: u64,
}

/// Minimize `objective` from `x0`.
pub fn minimize(
    objective: &Objective<'_>,
    x0: &[f64],
    settings: &Settings,
    pool: &ThreadPool,
) -> Result<Minimum, MinimizeError> {
    let mut x = x0.to_vec();
    let mut fx = objective.value(&x);
    if !fx.is_finite() {
        return Err(MinimizeError::NonFinite { x });
    }

    let mut g = objective.gradient(&x, pool);
    if inf_norm(&g) < settings.gradient_threshold {
        return Ok(Minimum { x, f: fx, iterations: 0 });
    }

    let mut best = fx;
    let mut stall = 0u64;
    let mut iterations = 0u64;

    loop {
        let h = objective.hessian(&x, pool);
        let mut d = newton_direction(&h, &g);
        let mut slope = dot(&g, &d);
        if !(slope < 0.0) {
            d = g.iter().map(|v| -v).collect();
            slope = -dot(&g, &g);
        }

        let Some((x_next, f_next)) = line_search(objective, &x, fx, &d, slope) else {
            return Err(MinimizeError::LineSearch { x, f: fx });
        };
        x = x_next;
        fx = f_next;
        iterations += 1;

        g = objective.gradient(&x, pool);
        trace!(iterations, f = fx, grad = inf_norm(&g), "newton step");
        if inf_norm(&g) < settings.gradient_threshold {
            return Ok(Minimum { x, f: fx, iterations });
        }

        if let Some(fc) = settings.function_converge {
            if best - fx > fc.absolute {
                best = fx;
                stall = 0;
            } else {
                stall += 1;
                if stall >= fc.window {
                    return Ok(Minimum { x, f: fx, iterations });
                }
            }
        }

        if iterations >= settings.max_iterations {
            return Err(MinimizeError::IterationLimit {
                x,
                f: fx,
                limit: settings.max_iterations,
            });
        }
    }
}

/// Solve `(H + τI) d = −g`, increasing `τ` until Cholesky succeeds.
///
/// Falls back to steepest descent when `H` is not finite or no shift works.
fn newton_direction(h: &DMatrix<f64>, g: &[f64]) -> Vec<f64> {
    let n = g.len();
    let steepest = || g.iter().map(|v| -v).collect::<Vec<f64>>();
    if h.iter().any(|v| !v.is_finite()) {
        return steepest();
    }

    let rhs = DVector::from_iterator(n, g.iter().map(|v| -v));
    let min_diag = (0..n).map(|i| h[(i, i)]).fold(f64::INFINITY, f64::min);
    let beta = 1e-3 * h.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
    let mut tau = if min_diag > 0.0 { 0.0 } else { beta - min_diag };

    for _ in 0..MAX_SHIFTS {
        let shifted = h.clone() + DMatrix::<f64>::identity(n, n) * tau;
        if let Some(chol) = shifted.cholesky() {
            let d = chol.solve(&rhs);
            if d.iter().all(|v| v.is_finite()) {
                return d.iter().copied().collect();
            }
        }
        tau = (10.0 * tau).max(beta);
    }

    steepest()
}

/// Backtracking Armijo search requiring `f(x + α·d) < f(x)`.
fn line_search(
    objective: &Objective<'_>,
    x: &[f64],
    fx: f64,
    d: &[f64],
    slope: f64,
) -> Option<(Vec<f64>, f64)> {
    let mut alpha = 1.0;
    for _ in 0..MAX_BACKTRACKS {
        let candidate: Vec<f64> = x.iter().zip(d).map(|(xi, di)| xi + alpha * di).collect();
        let f = objective.value(&candidate);
        if f.is_finite() && f < fx && f <= fx + ARMIJO * alpha * slope {
            return Some((candidate, f));
        }
        alpha *= 0.5;
    }
    None
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn settings(threshold: f64) -> Settings {
        Settings {
            gradient_threshold: threshold,
            function_converge: None,
            max_iterations: 1000,
        }
    }

    #[test]
    fn quadratic_bowl_converges_in_few_steps() {
        let obj = Objective::new(|p: &[f64]| (p[0] - 3.0).powi(2) + 10.0 * (p[1] + 1.0).powi(2));
        let min = minimize(&obj, &[0.0, 0.0], &settings(1e-8), &pool()).unwrap();
        assert!((min.x[0] - 3.0).abs() < 1e-6);
        assert!((min.x[1] + 1.0).abs() < 1e-6);
        assert!(min.iterations <= 5);
    }

    #[test]
    fn rosenbrock_converges() {
        let obj = Objective::new(|p: &[f64]| {
            (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2)
        });
        let min = minimize(&obj, &[-1.2, 1.0], &settings(1e-5), &pool()).unwrap();
        assert!((min.x[0] - 1.0).abs() < 1e-3);
        assert!((min.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn start_at_minimum_returns_immediately() {
        let obj = Objective::new(|p: &[f64]| p[0] * p[0]);
        let min = minimize(&obj, &[0.0], &settings(1e-12), &pool()).unwrap();
        assert_eq!(min.iterations, 0);
        assert_eq!(min.x, vec![0.0]);
    }

    #[test]
    fn non_finite_start_is_an_error() {
        let obj = Objective::new(|p: &[f64]| p[0].ln());
        let err = minimize(&obj, &[-1.0], &settings(1e-8), &pool()).unwrap_err();
        assert!(matches!(err, MinimizeError::NonFinite { .. }));
    }

    #[test]
    fn iteration_limit_reports_last_point() {
        let obj = Objective::new(|p: &[f64]| {
            (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2)
        });
        let tight = Settings {
            max_iterations: 1,
            ..settings(1e-12)
        };
        let err = minimize(&obj, &[-1.2, 1.0], &tight, &pool()).unwrap_err();
        match err {
            MinimizeError::IterationLimit { x, limit, .. } => {
                assert_eq!(limit, 1);
                assert_ne!(x, vec![-1.2, 1.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn analytic_gradient_is_used_when_supplied() {
        let obj = Objective::new(|p: &[f64]| (p[0] - 2.0).powi(2))
            .with_gradient(|p: &[f64]| vec![2.0 * (p[0] - 2.0)]);
        let g = obj.gradient(&[5.0], &pool());
        assert_eq!(g, vec![6.0]);
        let min = minimize(&obj, &[5.0], &settings(1e-10), &pool()).unwrap();
        assert!((min.x[0] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn indefinite_hessian_still_descends() {
        // Saddle-shaped start for f = x⁴ − x²: H < 0 at x = 0.1.
        let obj = Objective::new(|p: &[f64]| p[0].powi(4) - p[0] * p[0]);
        let min = minimize(&obj, &[0.1], &settings(1e-8), &pool()).unwrap();
        assert!((min.x[0] - 0.5f64.sqrt()).abs() < 1e-4);
    }
}
