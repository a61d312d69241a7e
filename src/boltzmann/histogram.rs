//! 1-D histogram and Boltzmann inversion.
//!
//! ```text
//! E(bin) = −R·T·ln(n(bin) / n_max)
//! ```
//!
//! Bins with zero occupancy are dropped before the logarithm; they carry no
//! statistical information and would otherwise be `+∞`.

use crate::domain::{FreeEnergyProfile, GAS_CONSTANT};
use crate::error::EngineError;

/// Invert a sampled coordinate into a free-energy profile.
///
/// Edges run from `min − increment` to `max + increment`; bins are closed-open.
/// The samples need not be sorted: a sorted working copy is made here.
pub fn invert(
    samples: &[f64],
    increment: f64,
    temperature: f64,
) -> Result<FreeEnergyProfile, EngineError> {
    check_increment(increment)?;
    check_temperature(temperature)?;
    if samples.is_empty() {
        return Err(EngineError::EmptySamples("histogram"));
    }
    check_finite(samples)?;

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let lo = sorted[0] - increment;
    let hi = sorted[sorted.len() - 1] + increment;
    let edges = bin_edges(lo, hi, increment);

    let mut counts = vec![0usize; edges.len() - 1];
    for &s in &sorted {
        if let Some(bin) = bin_index(&edges, s) {
            counts[bin] += 1;
        }
    }

    let max_count = counts.iter().copied().max().unwrap_or(0);
    let rt = GAS_CONSTANT * temperature;

    let mut coords = Vec::new();
    let mut energies = Vec::new();
    for (bin, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        coords.push(0.5 * (edges[bin] + edges[bin + 1]));
        energies.push(boltzmann_energy(count, max_count, rt));
    }

    Ok(FreeEnergyProfile { coords, energies })
}

/// `−RT·ln(n / n_max)` for a non-empty bin.
pub(crate) fn boltzmann_energy(count: usize, max_count: usize, rt: f64) -> f64 {
    -rt * (count as f64 / max_count as f64).ln()
}

/// Evenly spaced edges `lo, lo + inc, …` up to (and including) `hi`.
///
/// Edges are computed as `lo + i·inc` so rounding does not accumulate.
pub(crate) fn bin_edges(lo: f64, hi: f64, increment: f64) -> Vec<f64> {
    let n = ((hi - lo) / increment + 1e-9).floor() as usize + 1;
    (0..n.max(2)).map(|i| lo + i as f64 * increment).collect()
}

/// Index of the closed-open bin `[edges[k], edges[k+1])` holding `value`.
pub(crate) fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let above = edges.partition_point(|&e| e <= value);
    if above == 0 || above >= edges.len() {
        None
    } else {
        Some(above - 1)
    }
}

pub(crate) fn check_increment(increment: f64) -> Result<(), EngineError> {
    if increment.is_finite() && increment > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidIncrement(increment))
    }
}

pub(crate) fn check_temperature(temperature: f64) -> Result<(), EngineError> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidTemperature(temperature))
    }
}

pub(crate) fn check_finite(samples: &[f64]) -> Result<(), EngineError> {
    match samples.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(EngineError::NonFinite {
            index,
            value: samples[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_yields_one_zero_energy_bin() {
        let profile = invert(&[1.0, 1.0, 1.0], 0.1, 300.0).unwrap();
        assert_eq!(profile.len(), 1);
        assert!(profile.energies[0].abs() < 1e-12);
        assert!((profile.coords[0] - 1.05).abs() < 1e-9);
    }

    #[test]
    fn energy_scales_with_log_ratio() {
        // Two samples in one bin, one in the next.
        let profile = invert(&[0.01, 0.02, 0.15], 0.1, 300.0).unwrap();
        assert_eq!(profile.len(), 2);
        let rt = GAS_CONSTANT * 300.0;
        assert!(profile.energies[0].abs() < 1e-12);
        assert!((profile.energies[1] - rt * 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn unsorted_input_matches_sorted_input() {
        let a = invert(&[0.3, 0.1, 0.2, 0.1], 0.05, 298.0).unwrap();
        let b = invert(&[0.1, 0.1, 0.2, 0.3], 0.05, 298.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_samples_fail_fast() {
        assert!(matches!(
            invert(&[], 0.1, 298.0),
            Err(EngineError::EmptySamples(_))
        ));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(matches!(
            invert(&[1.0], 0.0, 298.0),
            Err(EngineError::InvalidIncrement(_))
        ));
        assert!(matches!(
            invert(&[1.0], 0.1, -1.0),
            Err(EngineError::InvalidTemperature(_))
        ));
        assert!(matches!(
            invert(&[1.0, f64::NAN], 0.1, 298.0),
            Err(EngineError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn bin_index_is_closed_open() {
        let edges = [0.0, 1.0, 2.0];
        assert_eq!(bin_index(&edges, 0.0), Some(0));
        assert_eq!(bin_index(&edges, 1.0), Some(1));
        assert_eq!(bin_index(&edges, 2.0), None);
        assert_eq!(bin_index(&edges, -0.5), None);
    }
}
