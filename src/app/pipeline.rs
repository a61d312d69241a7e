//! The fit workflow shared by the CLI and the integration tests:
//! read samples -> invert -> fit -> records.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::domain::{FitConfig, SampleSet};
use crate::error::AppError;
use crate::fit::{ParameterizationRun, parameterize};

/// All computed outputs of a single `bfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub parameterization: ParameterizationRun,
}

/// Read the configured sample set and parameterize it.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let samples = crate::io::read_samples_json(&config.samples)?;
    info!(
        path = %config.samples.display(),
        interactions = samples.interaction_count(),
        "loaded samples"
    );
    run_fit_with_samples(config, &samples)
}

/// Parameterize an in-memory sample set.
pub fn run_fit_with_samples(config: &FitConfig, samples: &SampleSet) -> Result<RunOutput, AppError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let parameterization = parameterize(samples, &config.engine, &mut rng)?;
    Ok(RunOutput { parameterization })
}
