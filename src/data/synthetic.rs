//! Synthetic sample sets for a four-bead chain.
//!
//! Bonds and angles are Gaussian around fixed means; the dihedral is a
//! two-state mixture around ±90° so its profile has two-fold symmetry.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Interaction, SampleSet};
use crate::error::AppError;

const BOND_MEAN_NM: f64 = 0.25;
const BOND_SD_NM: f64 = 0.008;
const ANGLE_MEAN_RAD: f64 = 2.0;
const ANGLE_SD_RAD: f64 = 0.08;
const DIHEDRAL_SD_RAD: f64 = 0.35;

/// Generate `frames` samples per interaction for the chain 0-1-2-3.
pub fn generate_chain_samples(frames: usize, seed: u64) -> Result<SampleSet, AppError> {
    if frames == 0 {
        return Err(AppError::new(2, "Frame count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let bond = Normal::new(BOND_MEAN_NM, BOND_SD_NM)
        .map_err(|e| AppError::new(4, format!("Bond distribution error: {e}")))?;
    let angle = Normal::new(ANGLE_MEAN_RAD, ANGLE_SD_RAD)
        .map_err(|e| AppError::new(4, format!("Angle distribution error: {e}")))?;
    let torsion = Normal::new(0.0, DIHEDRAL_SD_RAD)
        .map_err(|e| AppError::new(4, format!("Dihedral distribution error: {e}")))?;

    let mut samples = SampleSet::default();
    for i in 0..3 {
        samples.bonds.push(Interaction {
            beads: vec![i, i + 1],
            samples: (0..frames).map(|_| bond.sample(&mut rng)).collect(),
        });
    }
    for i in 0..2 {
        samples.angles.push(Interaction {
            beads: vec![i, i + 1, i + 2],
            samples: (0..frames).map(|_| angle.sample(&mut rng)).collect(),
        });
    }

    let dihedral = (0..frames)
        .map(|_| {
            let center = if rng.gen_bool(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
            wrap_angle(center + torsion.sample(&mut rng))
        })
        .collect();
    samples.dihedrals.push(Interaction {
        beads: vec![0, 1, 2, 3],
        samples: dihedral,
    });

    Ok(samples)
}

/// Wrap an angle into `(−π, π]`.
pub fn wrap_angle(x: f64) -> f64 {
    let mut y = x.rem_euclid(2.0 * PI);
    if y > PI {
        y -= 2.0 * PI;
    }
    y
}
