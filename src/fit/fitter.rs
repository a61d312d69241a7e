//! Fitting routines for a single functional form.
//!
//! Given a free-energy profile we:
//! - build the mean-square residual objective for the form
//! - pick an initial guess with the form's heuristic
//! - hand both to the `FitDriver`
//!
//! The simple-periodic form adds an outer retry loop that perturbs the
//! periodicity guess until the fitted multiplicity is plausible.

use std::f64::consts::PI;

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::{FitResult, FreeEnergyProfile, FunctionalForm, GradientMode, JointProfile};
use crate::fit::driver::FitDriver;
use crate::math::Objective;
use crate::models::{
    guess_for, harmonic_residual_gradient, joint_mean_square_residual, mean_square_residual,
};

/// Amplitudes at or below this are treated as vanished.
const VANISHED_AMPLITUDE: f64 = 1e-12;

/// Budget and retry count for simple-periodic fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicPolicy {
    pub max_iterations: i64,
    pub max_retries: usize,
}

impl Default for PeriodicPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            max_retries: 30,
        }
    }
}

/// Fit a 2- or 6-parameter form (everything but simple-periodic and
/// bending-torsion) to a 1-D profile.
pub fn fit_profile(
    driver: &FitDriver,
    form: FunctionalForm,
    profile: &FreeEnergyProfile,
    max_iterations: i64,
    gradient: GradientMode,
) -> FitResult {
    let guess = guess_for(form, profile);
    debug!(form = form.display_name(), ?guess, "initial guess");

    let mut objective = Objective::new(move |p: &[f64]| mean_square_residual(form, profile, p));
    if form == FunctionalForm::Harmonic && gradient == GradientMode::Analytic {
        objective = objective.with_gradient(move |p: &[f64]| harmonic_residual_gradient(profile, p));
    }

    driver.fit(&objective, &guess, max_iterations)
}

/// Fit `k·(1 + cos(n·x − eq))`, retrying while the periodicity is implausible.
///
/// A fit is implausible when `n == 0`, `n > 3`, or the amplitude vanished.
/// Each retry sets the `n` guess to 1 if it was below 1, otherwise adds a
/// uniform value in `[0, 1)`. Accepted fits are normalized with
/// [`normalize_periodic`].
pub fn fit_simple_periodic<R: Rng + ?Sized>(
    driver: &FitDriver,
    profile: &FreeEnergyProfile,
    policy: PeriodicPolicy,
    rng: &mut R,
) -> FitResult {
    let form = FunctionalForm::SimplePeriodic;
    let objective = Objective::new(move |p: &[f64]| mean_square_residual(form, profile, p));
    let mut guess = guess_for(form, profile);
    debug!(?guess, "initial periodic guess");

    let mut fit = driver.fit(&objective, &guess, policy.max_iterations);
    let mut retries = 0usize;
    while implausible_periodicity(&fit.params) && retries < policy.max_retries {
        let n = guess[2].unwrap_or(1.0);
        let next = if n < 1.0 { 1.0 } else { n + rng.gen_range(0.0..1.0) };
        debug!(n = fit.params[2], next_guess = next, "implausible periodicity, retrying");
        guess[2] = Some(next);
        fit = driver.fit(&objective, &guess, policy.max_iterations);
        retries += 1;
    }

    if implausible_periodicity(&fit.params) {
        warn!(retries, "simple periodic fit found no plausible periodicity");
        return FitResult::implausible_periodicity(form.param_len());
    }

    normalize_periodic(&mut fit.params);
    fit
}

/// Fit the bending-torsion form to a joint profile from an all-ones guess.
pub fn fit_bending_torsion(driver: &FitDriver, profile: &JointProfile, max_iterations: i64) -> FitResult {
    let objective = Objective::new(move |p: &[f64]| joint_mean_square_residual(profile, p));
    let guess = vec![Some(1.0); FunctionalForm::BendingTorsion.param_len()];
    driver.fit(&objective, &guess, max_iterations)
}

/// `eq < 0` becomes `eq + 2π` and the periodicity its absolute value.
pub fn normalize_periodic(params: &mut [f64]) {
    if params[0] < 0.0 {
        params[0] += 2.0 * PI;
        params[2] = params[2].abs();
    }
}

fn implausible_periodicity(params: &[f64]) -> bool {
    let (k, n) = (params[1], params[2]);
    n == 0.0 || n > 3.0 || k.abs() <= VANISHED_AMPLITUDE
}
