//! Potential evaluation for every functional form.
//!
//! The fitter relies on two primitive operations:
//! - evaluate `U(x)` for given parameters (objectives, reports, plots)
//! - the mean-square residual of a form against a profile (the fit objective)

use std::f64::consts::{FRAC_PI_2, PI};

use crate::domain::{FreeEnergyProfile, FunctionalForm, JointProfile};

/// Evaluate `form` at `x` with `params`.
///
/// `BendingTorsion` is evaluated at `x` as the torsion with both bends at 90°,
/// where the `sin³` prefactors are 1.
///
/// # Panics
/// Panics if `params` is shorter than `form.param_len()`.
pub fn evaluate(form: FunctionalForm, x: f64, params: &[f64]) -> f64 {
    match form {
        FunctionalForm::Harmonic => {
            let (eq, k) = (params[0], params[1]);
            0.5 * k * (x - eq).powi(2)
        }
        FunctionalForm::CosineHarmonic => {
            let (eq, k) = (params[0], params[1]);
            0.5 * k * (x.cos() - eq.cos()).powi(2)
        }
        FunctionalForm::RestrictedBending => {
            let (eq, k) = (params[0], params[1]);
            0.5 * k * (x.cos() - eq.cos()).powi(2) / x.sin().powi(2)
        }
        FunctionalForm::SimplePeriodic => {
            let (eq, k, n) = (params[0], params[1], params[2]);
            k * (1.0 + (n * x - eq).cos())
        }
        FunctionalForm::RyckaertBellemans => {
            let c = (x - PI).cos();
            polynomial(&params[..6], c)
        }
        FunctionalForm::BendingTorsion => bending_torsion(x, FRAC_PI_2, FRAC_PI_2, params),
    }
}

/// `k·sin³(b1)·sin³(b2)·Σ cⱼ·cos(tor)ʲ` with `params = [k, c0, …, c4]`.
pub fn bending_torsion(torsion: f64, bend1: f64, bend2: f64, params: &[f64]) -> f64 {
    let k = params[0];
    k * bend1.sin().powi(3) * bend2.sin().powi(3) * polynomial(&params[1..6], torsion.cos())
}

/// `Σ coeffs[i]·tⁱ` (Horner).
fn polynomial(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// `Σ (E − U(x))² / (2N)` for a 1-D profile.
pub fn mean_square_residual(form: FunctionalForm, profile: &FreeEnergyProfile, params: &[f64]) -> f64 {
    let n = profile.len().max(1) as f64;
    let sum: f64 = profile
        .coords
        .iter()
        .zip(&profile.energies)
        .map(|(&x, &e)| (e - evaluate(form, x, params)).powi(2))
        .sum();
    sum / (2.0 * n)
}

/// `Σ (E − U(tor, b1, b2))² / (2N)` for the bending-torsion form.
pub fn joint_mean_square_residual(profile: &JointProfile, params: &[f64]) -> f64 {
    let n = profile.len().max(1) as f64;
    let mut sum = 0.0;
    for i in 0..profile.len() {
        let u = bending_torsion(profile.torsion[i], profile.bend1[i], profile.bend2[i], params);
        sum += (profile.energies[i] - u).powi(2);
    }
    sum / (2.0 * n)
}

/// Closed-form gradient of the harmonic mean-square residual w.r.t. `(eq, k)`.
pub fn harmonic_residual_gradient(profile: &FreeEnergyProfile, params: &[f64]) -> Vec<f64> {
    let (eq, k) = (params[0], params[1]);
    let n = profile.len().max(1) as f64;
    let mut g = vec![0.0; 2];
    for (&x, &e) in profile.coords.iter().zip(&profile.energies) {
        let dx = x - eq;
        let r = e - 0.5 * k * dx * dx;
        g[0] += r * k * dx;
        g[1] -= r * 0.5 * dx * dx;
    }
    g.iter_mut().for_each(|v| *v /= n);
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;

    #[test]
    fn harmonic_is_zero_at_equilibrium() {
        assert_eq!(evaluate(FunctionalForm::Harmonic, 0.15, &[0.15, 5000.0]), 0.0);
        let u = evaluate(FunctionalForm::Harmonic, 0.16, &[0.15, 5000.0]);
        assert!((u - 0.25).abs() < 1e-9);
    }

    #[test]
    fn restricted_bending_matches_cosine_form_over_sin_squared() {
        let params = [2.0, 80.0];
        let x = 1.7;
        let cos_h = evaluate(FunctionalForm::CosineHarmonic, x, &params);
        let reb = evaluate(FunctionalForm::RestrictedBending, x, &params);
        assert!((reb - cos_h / x.sin().powi(2)).abs() < 1e-12);
    }

    #[test]
    fn periodic_peaks_at_twice_amplitude() {
        let u = evaluate(FunctionalForm::SimplePeriodic, 0.5, &[1.0, 3.0, 2.0]);
        assert!((u - 6.0).abs() < 1e-12);
    }

    #[test]
    fn ryckaert_bellemans_is_a_cosine_polynomial() {
        let params = [2.0, -1.0, 0.5, 0.3, -0.2, 0.1];
        // At x = π, cos(x − π) = 1 so U is the coefficient sum.
        let u = evaluate(FunctionalForm::RyckaertBellemans, PI, &params);
        assert!((u - params.iter().sum::<f64>()).abs() < 1e-12);
    }

    #[test]
    fn bending_torsion_vanishes_for_straight_bends() {
        let params = [1.0; 6];
        assert!(bending_torsion(0.3, 0.0, 1.0, &params).abs() < 1e-12);
        let u = bending_torsion(0.0, FRAC_PI_2, FRAC_PI_2, &params);
        assert!((u - 5.0).abs() < 1e-12);
    }

    #[test]
    fn analytic_harmonic_gradient_matches_finite_differences() {
        let coords: Vec<f64> = (0..21).map(|i| 0.13 + 0.002 * i as f64).collect();
        let energies = coords.iter().map(|x| 0.5 * 4000.0 * (x - 0.151f64).powi(2)).collect();
        let profile = FreeEnergyProfile { coords, energies };
        let at = [0.148, 3500.0];

        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let f = |p: &[f64]| mean_square_residual(FunctionalForm::Harmonic, &profile, p);
        let fd = crate::math::central_gradient(&f, &at, &pool);
        let exact = harmonic_residual_gradient(&profile, &at);

        for (a, b) in fd.iter().zip(&exact) {
            assert!((a - b).abs() <= 1e-5 * b.abs().max(1e-6), "fd={a} exact={b}");
        }
    }
}
