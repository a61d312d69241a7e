//! Initial-guess heuristics, one per functional form.
//!
//! Guesses are `Option<f64>` per parameter slot; `None` means "no opinion" and
//! is replaced by 1.0 when the fit starts.

use std::f64::consts::PI;

use crate::domain::{FreeEnergyProfile, FunctionalForm};

/// Energies at or below this magnitude count as the profile minimum.
const ZERO_ENERGY: f64 = 1e-12;

/// Initial guess for `form` from a 1-D profile.
///
/// `BendingTorsion` has no 1-D heuristic and gets all-ones like RB.
pub fn guess_for(form: FunctionalForm, profile: &FreeEnergyProfile) -> Vec<Option<f64>> {
    match form {
        FunctionalForm::Harmonic => harmonic_guess(profile),
        FunctionalForm::CosineHarmonic => cosine_harmonic_guess(profile),
        FunctionalForm::RestrictedBending => restricted_bending_guess(profile),
        FunctionalForm::SimplePeriodic => simple_periodic_guess(profile),
        FunctionalForm::RyckaertBellemans | FunctionalForm::BendingTorsion => {
            vec![Some(1.0); form.param_len()]
        }
    }
}

/// `[eq, k]`: eq at the first zero-energy point, k from central slopes.
///
/// Each interior point (excluding the minimum itself) contributes
/// `slope / (x − eq)`; k is the mean of the finite contributions.
pub fn harmonic_guess(profile: &FreeEnergyProfile) -> Vec<Option<f64>> {
    let (eq, k) = slope_guess(profile, |x| x);
    vec![Some(eq), Some(k)]
}

/// `[eq, k / sin²(eq)]` from the harmonic guess.
pub fn cosine_harmonic_guess(profile: &FreeEnergyProfile) -> Vec<Option<f64>> {
    let (eq, k) = slope_guess(profile, |x| x);
    vec![Some(eq), Some(k / eq.sin().powi(2))]
}

/// `[eq, k]` with slopes taken against `cos x`.
pub fn restricted_bending_guess(profile: &FreeEnergyProfile) -> Vec<Option<f64>> {
    let (eq, k) = slope_guess(profile, f64::cos);
    vec![Some(eq), Some(k)]
}

/// `[eq, k, n]` for `k·(1 + cos(n·x − eq))`.
///
/// - eq: coordinate of the last zero-energy point
/// - n: `π·turns / range` when the interior has more than one extremum, else 1
/// - k: `2π·max(E) / (2·range)`
///
/// with `range = x[len−2] − x[1]`.
pub fn simple_periodic_guess(profile: &FreeEnergyProfile) -> Vec<Option<f64>> {
    let x = &profile.coords;
    let y = &profile.energies;
    let len = x.len();

    let eq = y
        .iter()
        .rposition(|e| e.abs() <= ZERO_ENERGY)
        .map(|i| x[i])
        .unwrap_or(1.0);

    let mut turns = 0usize;
    for i in 1..len.saturating_sub(1) {
        let is_max = y[i] > y[i - 1] && y[i] > y[i + 1];
        let is_min = y[i] < y[i - 1] && y[i] < y[i + 1];
        if is_max || is_min {
            turns += 1;
        }
    }

    let range = if len >= 3 { x[len - 2] - x[1] } else { 0.0 };
    let usable = range.is_finite() && range > 0.0;

    let n = if turns > 1 && usable {
        PI * turns as f64 / range
    } else {
        1.0
    };
    let max_e = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let k = if usable && max_e.is_finite() {
        2.0 * PI * max_e / (2.0 * range)
    } else {
        1.0
    };

    vec![Some(eq), Some(k), Some(n)]
}

fn slope_guess(profile: &FreeEnergyProfile, axis: impl Fn(f64) -> f64) -> (f64, f64) {
    let x = &profile.coords;
    let y = &profile.energies;

    let (eq, min_index) = y
        .iter()
        .position(|e| e.abs() <= ZERO_ENERGY)
        .map(|i| (x[i], i))
        .unwrap_or((1.0, 0));

    let mut acc = 0.0;
    let mut count = 0usize;
    for i in 1..x.len().saturating_sub(1) {
        if i == min_index {
            continue;
        }
        let back = (y[i - 1] - y[i]) / (axis(x[i - 1]) - axis(x[i]));
        let fwd = (y[i] - y[i + 1]) / (axis(x[i]) - axis(x[i + 1]));
        let contribution = 0.5 * (back + fwd) / (x[i] - eq);
        if contribution.is_finite() {
            acc += contribution;
            count += 1;
        }
    }

    let k = if count > 0 { acc / count as f64 } else { 1.0 };
    (eq, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(coords: Vec<f64>, f: impl Fn(f64) -> f64) -> FreeEnergyProfile {
        let energies = coords.iter().map(|&x| f(x)).collect();
        FreeEnergyProfile { coords, energies }
    }

    #[test]
    fn harmonic_guess_recovers_exact_parabola() {
        let coords = (0..31).map(|i| 0.12 + 0.002 * i as f64).collect();
        let p = profile(coords, |x| 0.5 * 5000.0 * (x - 0.15f64).powi(2));
        let g = harmonic_guess(&p);
        let eq = g[0].unwrap();
        let k = g[1].unwrap();
        assert!((eq - 0.15).abs() < 1e-9);
        assert!((k - 5000.0).abs() / 5000.0 < 1e-6);
    }

    #[test]
    fn missing_zero_defaults_equilibrium_to_one() {
        let p = profile(vec![0.1, 0.2, 0.3], |x| x + 1.0);
        let g = harmonic_guess(&p);
        assert_eq!(g[0], Some(1.0));
        assert!(g[1].unwrap().is_finite());
    }

    #[test]
    fn cosine_guess_divides_by_sin_squared() {
        let coords = (0..41).map(|i| 2.0 + (i as f64 - 20.0).to_radians()).collect();
        let p = profile(coords, |x| 0.5 * 80.0 * (x - 2.0f64).powi(2));
        let h = harmonic_guess(&p);
        let c = cosine_harmonic_guess(&p);
        let eq = h[0].unwrap();
        assert!((c[1].unwrap() - h[1].unwrap() / eq.sin().powi(2)).abs() < 1e-9);
    }

    #[test]
    fn periodic_guess_counts_interior_extrema() {
        let coords: Vec<f64> = (0..72).map(|i| -PI + (5.0 * (i as f64 + 0.5)).to_radians()).collect();
        let p = profile(coords, |x| 3.0 * (1.0 + (2.0 * x - 1.0).cos()));
        let g = simple_periodic_guess(&p);
        // Two maxima and two minima inside the window.
        let n = g[2].unwrap();
        assert!(n > 1.5 && n < 2.5, "n = {n}");
        assert!(g[1].unwrap() > 0.0);
    }

    #[test]
    fn flat_profile_gives_unit_periodicity() {
        let coords = (0..36).map(|i| (i as f64 * 10.0).to_radians()).collect();
        let p = profile(coords, |_| 0.0);
        let g = simple_periodic_guess(&p);
        assert_eq!(g[2], Some(1.0));
        assert_eq!(g[1], Some(0.0));
    }

    #[test]
    fn polynomial_forms_start_from_ones() {
        let p = profile(vec![0.0, 1.0], |_| 0.0);
        assert_eq!(guess_for(FunctionalForm::RyckaertBellemans, &p), vec![Some(1.0); 6]);
        assert_eq!(guess_for(FunctionalForm::BendingTorsion, &p), vec![Some(1.0); 6]);
    }
}
