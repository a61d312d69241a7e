//! Nonlinear least-squares driver with an escalating-tolerance retry policy.
//!
//! 1. Newton from the guess with a strict gradient threshold (1e-12) and no
//!    function-change criterion.
//! 2. On failure, retry from the last point reached with gradient thresholds
//!    1e-6, 5e-6, … while `<= 0.01`, each also accepting a stalled objective
//!    (absolute change 1e-5).
//! 3. If every attempt fails, report the guess with `MinimizerFailed`.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::domain::FitResult;
use crate::error::EngineError;
use crate::math::{FunctionConverge, Objective, Settings, minimize};

/// Budget used when the caller passes `max_iterations <= 0`.
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000_000;

const FIRST_GRADIENT_THRESHOLD: f64 = 1e-12;
const RETRY_GRADIENT_START: f64 = 1e-6;
const RETRY_GRADIENT_FACTOR: f64 = 5.0;
const RETRY_GRADIENT_LIMIT: f64 = 0.01;
const RETRY_FUNCTION_ABSOLUTE: f64 = 1e-5;

/// Owns the finite-difference worker pool shared by all fits of a run.
pub struct FitDriver {
    pool: ThreadPool,
}

impl FitDriver {
    /// Build a driver whose finite differences run on `workers` threads.
    pub fn new(workers: usize) -> Result<Self, EngineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("bfit-fd-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Fit `objective` starting from `guess`; unset slots start at 1.0.
    ///
    /// Never fails: non-convergence yields the `MinimizerFailed` sentinel.
    pub fn fit(&self, objective: &Objective<'_>, guess: &[Option<f64>], max_iterations: i64) -> FitResult {
        let start = resolve_guess(guess);
        let budget = resolve_budget(max_iterations);

        let first = Settings {
            gradient_threshold: FIRST_GRADIENT_THRESHOLD,
            function_converge: None,
            max_iterations: budget,
        };
        let mut last = match minimize(objective, &start, &first, &self.pool) {
            Ok(min) => {
                debug!(iterations = min.iterations, residual = min.f, "fit converged");
                return FitResult::converged(min.x, min.f);
            }
            Err(err) => {
                debug!(%err, "first minimization failed, relaxing tolerance");
                err.last_point().to_vec()
            }
        };

        let mut threshold = RETRY_GRADIENT_START;
        while threshold <= RETRY_GRADIENT_LIMIT {
            let retry = Settings {
                gradient_threshold: threshold,
                function_converge: Some(FunctionConverge {
                    absolute: RETRY_FUNCTION_ABSOLUTE,
                    window: budget,
                }),
                max_iterations: budget,
            };
            match minimize(objective, &last, &retry, &self.pool) {
                Ok(min) => {
                    debug!(threshold, iterations = min.iterations, residual = min.f, "fit converged on retry");
                    return FitResult::converged(min.x, min.f);
                }
                Err(err) => {
                    debug!(threshold, %err, "retry failed");
                    last = err.last_point().to_vec();
                }
            }
            threshold *= RETRY_GRADIENT_FACTOR;
        }

        warn!("all minimization attempts failed, keeping the initial guess");
        FitResult::minimizer_failed(start)
    }
}

/// Replace unset guess slots by 1.0.
pub fn resolve_guess(guess: &[Option<f64>]) -> Vec<f64> {
    guess.iter().map(|g| g.unwrap_or(1.0)).collect()
}

fn resolve_budget(max_iterations: i64) -> u64 {
    if max_iterations <= 0 {
        DEFAULT_MAX_ITERATIONS
    } else {
        max_iterations as u64
    }
}
