//! Error types.
//!
//! - `EngineError`: malformed input reaching the inversion/fit engine (fatal).
//! - `MinimizeError`: a single minimizer run that did not converge. The fit
//!   driver consumes these and retries; they never leave `fit`.
//! - `AppError`: what the binary reports, with a process exit code.

use thiserror::Error;

/// Input-shape errors raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no samples supplied for {0}")]
    EmptySamples(&'static str),

    #[error("sample sequences differ in length: {0}")]
    LengthMismatch(String),

    #[error("non-finite sample value {value} at position {index}")]
    NonFinite { index: usize, value: f64 },

    #[error("histogram increment must be finite and > 0 (got {0})")]
    InvalidIncrement(f64),

    #[error("temperature must be finite and > 0 K (got {0})")]
    InvalidTemperature(f64),

    #[error("{category} entry {index} has {found} beads, expected {expected}")]
    BeadCount {
        category: &'static str,
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error("failed to build finite-difference worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a minimizer run stopped short of convergence.
///
/// Each variant carries the last point reached and its objective value so a
/// retry can resume from there.
#[derive(Debug, Clone, Error)]
pub enum MinimizeError {
    #[error("line search could not decrease the objective (f = {f})")]
    LineSearch { x: Vec<f64>, f: f64 },

    #[error("iteration limit of {limit} reached (f = {f})")]
    IterationLimit { x: Vec<f64>, f: f64, limit: u64 },

    #[error("objective is not finite at the current point")]
    NonFinite { x: Vec<f64> },
}

impl MinimizeError {
    /// The point the minimizer stopped at.
    pub fn last_point(&self) -> &[f64] {
        match self {
            MinimizeError::LineSearch { x, .. }
            | MinimizeError::IterationLimit { x, .. }
            | MinimizeError::NonFinite { x } => x,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let code = match err {
            EngineError::EmptySamples(_) => 3,
            EngineError::WorkerPool(_) => 4,
            _ => 2,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
