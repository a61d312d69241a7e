//! Joint (torsion, bend1, bend2) Boltzmann inversion for the combined
//! bending-torsion potential.

use std::collections::BTreeMap;

use crate::boltzmann::histogram::{
    bin_index, boltzmann_energy, check_finite, check_increment, check_temperature,
};
use crate::domain::{GAS_CONSTANT, JointProfile};
use crate::error::EngineError;

/// Cell increments along (torsion, bend1, bend2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointIncrements {
    pub torsion: f64,
    pub bend1: f64,
    pub bend2: f64,
}

/// Invert index-aligned triplets into a joint profile.
///
/// Each axis is cut into cells `[s, s + inc)` with `s` starting at the axis
/// minimum and stepping while `s <= max + inc`. Counting uses the triplets as
/// given; only the axis ranges come from sorted copies. Cells are emitted in
/// (torsion, bend1, bend2) order, and each cell's coordinates are
/// `(low − high) / 2` on every axis.
pub fn invert_joint(
    torsion: &[f64],
    bend1: &[f64],
    bend2: &[f64],
    increments: JointIncrements,
    temperature: f64,
) -> Result<JointProfile, EngineError> {
    if torsion.len() != bend1.len() || torsion.len() != bend2.len() {
        return Err(EngineError::LengthMismatch(format!(
            "torsion={}, bend1={}, bend2={}",
            torsion.len(),
            bend1.len(),
            bend2.len()
        )));
    }
    if torsion.is_empty() {
        return Err(EngineError::EmptySamples("joint histogram"));
    }
    check_temperature(temperature)?;

    let tor_axis = Axis::new(torsion, increments.torsion)?;
    let b1_axis = Axis::new(bend1, increments.bend1)?;
    let b2_axis = Axis::new(bend2, increments.bend2)?;

    let mut counts: BTreeMap<(usize, usize, usize), usize> = BTreeMap::new();
    for ((&t, &a), &b) in torsion.iter().zip(bend1).zip(bend2) {
        let (Some(i), Some(j), Some(k)) = (tor_axis.cell(t), b1_axis.cell(a), b2_axis.cell(b))
        else {
            continue;
        };
        *counts.entry((i, j, k)).or_insert(0) += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let rt = GAS_CONSTANT * temperature;

    let mut profile = JointProfile {
        torsion: Vec::with_capacity(counts.len()),
        bend1: Vec::with_capacity(counts.len()),
        bend2: Vec::with_capacity(counts.len()),
        energies: Vec::with_capacity(counts.len()),
    };
    for (&(i, j, k), &count) in &counts {
        profile.torsion.push(tor_axis.offset(i));
        profile.bend1.push(b1_axis.offset(j));
        profile.bend2.push(b2_axis.offset(k));
        profile.energies.push(boltzmann_energy(count, max_count, rt));
    }

    Ok(profile)
}

/// Cell boundaries along one axis.
struct Axis {
    /// Cell lower bounds followed by the final upper bound.
    bounds: Vec<f64>,
}

impl Axis {
    fn new(values: &[f64], increment: f64) -> Result<Self, EngineError> {
        check_increment(increment)?;
        check_finite(values)?;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let cells = ((max + increment - min) / increment + 1e-9).floor() as usize + 1;
        let bounds = (0..=cells).map(|i| min + i as f64 * increment).collect();
        Ok(Self { bounds })
    }

    fn cell(&self, value: f64) -> Option<usize> {
        bin_index(&self.bounds, value)
    }

    fn offset(&self, cell: usize) -> f64 {
        (self.bounds[cell] - self.bounds[cell + 1]) / 2.0
    }
}
