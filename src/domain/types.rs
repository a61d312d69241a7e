//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during inversion and fitting
//! - read from a sample-set JSON and exported as records JSON
//! - reused by the report and plot front-ends

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Molar gas constant in kJ/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314462618e-3;

/// Residual reported when every minimizer attempt failed.
pub const FAILED_FIT_RESIDUAL: f64 = 999_999.9;

/// Residual reported when no plausible periodicity was found.
pub const PERIODIC_FAILURE_RESIDUAL: f64 = 225.0;

/// Interaction category, in the order the engine processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bonds,
    Angles,
    Reb,
    Dihedrals,
    Impropers,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bonds,
        Category::Angles,
        Category::Reb,
        Category::Dihedrals,
        Category::Impropers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Bonds => "bonds",
            Category::Angles => "angles",
            Category::Reb => "reb",
            Category::Dihedrals => "dihedrals",
            Category::Impropers => "impropers",
        }
    }

    /// Number of beads that define one interaction of this category.
    pub fn bead_count(self) -> usize {
        match self {
            Category::Bonds => 2,
            Category::Angles | Category::Reb => 3,
            Category::Dihedrals | Category::Impropers => 4,
        }
    }

    /// Whether samples are angles (radians) rather than lengths (nm).
    pub fn is_angular(self) -> bool {
        !matches!(self, Category::Bonds)
    }
}

/// Parametric potential forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalForm {
    /// `0.5·k·(x − eq)²`
    Harmonic,
    /// `0.5·k·(cos x − cos eq)²`
    CosineHarmonic,
    /// `0.5·k·(cos x − cos eq)² / sin² x`
    RestrictedBending,
    /// `k·(1 + cos(n·x − eq))`
    SimplePeriodic,
    /// `Σ cᵢ·cos(x − π)ⁱ`, i = 0..5
    RyckaertBellemans,
    /// `k·sin³(b1)·sin³(b2)·Σ cⱼ·cos(tor)ʲ`, j = 0..4
    BendingTorsion,
}

impl FunctionalForm {
    pub fn display_name(self) -> &'static str {
        match self {
            FunctionalForm::Harmonic => "harmonic",
            FunctionalForm::CosineHarmonic => "cosine-harmonic",
            FunctionalForm::RestrictedBending => "restricted-bending",
            FunctionalForm::SimplePeriodic => "simple-periodic",
            FunctionalForm::RyckaertBellemans => "ryckaert-bellemans",
            FunctionalForm::BendingTorsion => "bending-torsion",
        }
    }

    /// Length of the parameter vector for this form.
    pub fn param_len(self) -> usize {
        match self {
            FunctionalForm::Harmonic
            | FunctionalForm::CosineHarmonic
            | FunctionalForm::RestrictedBending => 2,
            FunctionalForm::SimplePeriodic => 3,
            FunctionalForm::RyckaertBellemans | FunctionalForm::BendingTorsion => 6,
        }
    }

    /// GROMACS `funct` column for this form within a category.
    pub fn gromacs_funct(self, category: Category) -> u8 {
        match (self, category) {
            (FunctionalForm::Harmonic, Category::Impropers) => 2,
            (FunctionalForm::Harmonic, _) => 1,
            (FunctionalForm::CosineHarmonic, _) => 2,
            (FunctionalForm::RestrictedBending, _) => 10,
            (FunctionalForm::SimplePeriodic, _) => 1,
            (FunctionalForm::RyckaertBellemans, _) => 3,
            (FunctionalForm::BendingTorsion, _) => 11,
        }
    }
}

/// Outcome flag of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    Converged,
    /// Every minimizer attempt failed; params are the defaulted guess.
    MinimizerFailed,
    /// Periodic retries exhausted; params are zero.
    ImplausiblePeriodicity,
}

impl FitStatus {
    pub fn is_converged(self) -> bool {
        self == FitStatus::Converged
    }
}

/// Parameters of one fit plus its mean-square residual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: Vec<f64>,
    /// Objective value `Σ (y − model)² / (2N)` at `params`.
    pub residual: f64,
    pub status: FitStatus,
}

impl FitResult {
    pub fn converged(params: Vec<f64>, residual: f64) -> Self {
        Self {
            params,
            residual,
            status: FitStatus::Converged,
        }
    }

    pub fn minimizer_failed(guess: Vec<f64>) -> Self {
        Self {
            params: guess,
            residual: FAILED_FIT_RESIDUAL,
            status: FitStatus::MinimizerFailed,
        }
    }

    pub fn implausible_periodicity(param_len: usize) -> Self {
        Self {
            params: vec![0.0; param_len],
            residual: PERIODIC_FAILURE_RESIDUAL,
            status: FitStatus::ImplausiblePeriodicity,
        }
    }

    /// Root-mean-square deviation between profile and fitted curve.
    pub fn rmsd(&self) -> f64 {
        (2.0 * self.residual).sqrt()
    }
}

/// 1-D free-energy profile: one entry per non-empty histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeEnergyProfile {
    /// Bin midpoints, strictly increasing.
    pub coords: Vec<f64>,
    /// Free energies in kJ/mol, zero at the most populated bin.
    pub energies: Vec<f64>,
}

impl FreeEnergyProfile {
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Joint (torsion, bend1, bend2) free-energy profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointProfile {
    pub torsion: Vec<f64>,
    pub bend1: Vec<f64>,
    pub bend2: Vec<f64>,
    pub energies: Vec<f64>,
}

impl JointProfile {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

/// One bonded interaction and its sampled coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Zero-based bead indices.
    pub beads: Vec<usize>,
    /// One measurement per frame, nm for bonds and radians otherwise.
    pub samples: Vec<f64>,
}

/// Per-category samples collected from a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    #[serde(default)]
    pub bonds: Vec<Interaction>,
    #[serde(default)]
    pub angles: Vec<Interaction>,
    #[serde(default)]
    pub reb: Vec<Interaction>,
    #[serde(default)]
    pub dihedrals: Vec<Interaction>,
    #[serde(default)]
    pub impropers: Vec<Interaction>,
}

impl SampleSet {
    pub fn category(&self, category: Category) -> &[Interaction] {
        match category {
            Category::Bonds => &self.bonds,
            Category::Angles => &self.angles,
            Category::Reb => &self.reb,
            Category::Dihedrals => &self.dihedrals,
            Category::Impropers => &self.impropers,
        }
    }

    pub fn interaction_count(&self) -> usize {
        Category::ALL.iter().map(|&c| self.category(c).len()).sum()
    }

    /// Check bead counts for every interaction.
    pub fn validate(&self) -> Result<(), EngineError> {
        for category in Category::ALL {
            let expected = category.bead_count();
            for (index, interaction) in self.category(category).iter().enumerate() {
                if interaction.beads.len() != expected {
                    return Err(EngineError::BeadCount {
                        category: category.label(),
                        index,
                        found: interaction.beads.len(),
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

/// One fitted parameter set, ready for topology emission.
///
/// Angle-type equilibrium values are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondedRecord {
    /// Index of the interaction within its category.
    pub id: usize,
    pub category: Category,
    pub beads: Vec<usize>,
    pub form: FunctionalForm,
    pub params: Vec<f64>,
    pub rmsd: f64,
    /// Emit as an alternative (commented) line.
    pub commented: bool,
    pub status: FitStatus,
}

/// Schema of an exported records JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    /// Kelvin.
    pub temperature: f64,
    pub records: Vec<BondedRecord>,
}

/// Histogram increments per category (nm for bonds, radians otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Increments {
    pub bond: f64,
    pub angle: f64,
    pub reb: f64,
    pub dihedral: f64,
    pub improper: f64,
}

impl Default for Increments {
    fn default() -> Self {
        Self {
            bond: 0.001,
            angle: 1f64.to_radians(),
            reb: 1f64.to_radians(),
            dihedral: 10f64.to_radians(),
            improper: 1f64.to_radians(),
        }
    }
}

impl Increments {
    pub fn for_category(&self, category: Category) -> f64 {
        match category {
            Category::Bonds => self.bond,
            Category::Angles => self.angle,
            Category::Reb => self.reb,
            Category::Dihedrals => self.dihedral,
            Category::Impropers => self.improper,
        }
    }
}

/// How the objective gradient is obtained for harmonic fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    #[default]
    FiniteDifference,
    /// Closed-form gradient of the harmonic objective.
    Analytic,
}

/// Settings of the parameterization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Kelvin.
    pub temperature: f64,
    pub increments: Increments,
    /// Fit driver budget; `<= 0` selects the large default.
    pub max_iterations: i64,
    /// Budget for each simple-periodic fit.
    pub periodic_iterations: i64,
    pub periodic_retries: usize,
    /// Finite-difference worker pool size.
    pub workers: usize,
    /// Dihedral periodic records above this RMSD are commented.
    pub comment_rmsd: f64,
    /// Degrees from 0/180 within which improper equilibria snap to 180.
    pub improper_tolerance_deg: f64,
    pub gradient: GradientMode,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            temperature: 298.0,
            increments: Increments::default(),
            max_iterations: 0,
            periodic_iterations: 10_000,
            periodic_retries: 30,
            workers: 4,
            comment_rmsd: 10.0,
            improper_tolerance_deg: 10.0,
            gradient: GradientMode::FiniteDifference,
        }
    }
}

/// Configuration for a `bfit fit` run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub samples: PathBuf,
    pub engine: EngineOptions,
    /// Seed for periodic retry perturbations; entropy when absent.
    pub seed: Option<u64>,
    pub itp: PathBuf,
    pub export_records: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_lengths_follow_form() {
        assert_eq!(FunctionalForm::Harmonic.param_len(), 2);
        assert_eq!(FunctionalForm::SimplePeriodic.param_len(), 3);
        assert_eq!(FunctionalForm::RyckaertBellemans.param_len(), 6);
        assert_eq!(FunctionalForm::BendingTorsion.param_len(), 6);
    }

    #[test]
    fn improper_harmonic_uses_funct_two() {
        assert_eq!(FunctionalForm::Harmonic.gromacs_funct(Category::Bonds), 1);
        assert_eq!(FunctionalForm::Harmonic.gromacs_funct(Category::Impropers), 2);
        assert_eq!(FunctionalForm::RestrictedBending.gromacs_funct(Category::Reb), 10);
    }

    #[test]
    fn sentinel_results_carry_status() {
        let failed = FitResult::minimizer_failed(vec![1.0, 1.0]);
        assert_eq!(failed.status, FitStatus::MinimizerFailed);
        assert_eq!(failed.residual, FAILED_FIT_RESIDUAL);

        let periodic = FitResult::implausible_periodicity(3);
        assert_eq!(periodic.params, vec![0.0; 3]);
        assert!((periodic.rmsd() - 450f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_wrong_bead_count() {
        let mut set = SampleSet::default();
        set.angles.push(Interaction {
            beads: vec![0, 1],
            samples: vec![1.0],
        });
        let err = set.validate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::BeadCount { category: "angles", found: 2, expected: 3, .. }
        ));
    }

    #[test]
    fn missing_categories_default_to_empty() {
        let set: SampleSet =
            serde_json::from_str(r#"{"bonds":[{"beads":[0,1],"samples":[0.15]}]}"#).unwrap();
        assert_eq!(set.bonds.len(), 1);
        assert!(set.dihedrals.is_empty());
        assert_eq!(set.interaction_count(), 1);
    }
}
