//! Parameterization of a whole sample set.
//!
//! Categories run in a fixed order (bonds, angles, reb, dihedrals, impropers);
//! within a category interactions run in input order. Each interaction is
//! inverted once and then fitted with every form its category uses:
//!
//! | category  | forms (commented alternatives in parentheses)            |
//! |-----------|----------------------------------------------------------|
//! | bonds     | harmonic                                                 |
//! | angles    | harmonic, (cosine-harmonic)                              |
//! | reb       | restricted bending                                       |
//! | dihedrals | simple periodic, Ryckaert-Bellemans, (bending-torsion)   |
//! | impropers | harmonic                                                 |
//!
//! Of the two dihedral forms exactly one is active: the periodic record is
//! commented when its RMSD exceeds the configured threshold, and the
//! Ryckaert-Bellemans record is commented otherwise.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::boltzmann::{JointIncrements, invert, invert_joint};
use crate::domain::{
    BondedRecord, Category, EngineOptions, FitResult, FreeEnergyProfile, FunctionalForm,
    Interaction, SampleSet,
};
use crate::error::EngineError;
use crate::fit::coupled::adjacent_angles;
use crate::fit::driver::FitDriver;
use crate::fit::fitter::{PeriodicPolicy, fit_bending_torsion, fit_profile, fit_simple_periodic};

/// Profile and raw fits (radians) of one interaction.
#[derive(Debug, Clone)]
pub struct InteractionFit {
    pub category: Category,
    pub index: usize,
    pub beads: Vec<usize>,
    pub profile: FreeEnergyProfile,
    pub fits: Vec<(FunctionalForm, FitResult)>,
}

/// Everything computed by [`parameterize`].
#[derive(Debug, Clone, Default)]
pub struct ParameterizationRun {
    pub interactions: Vec<InteractionFit>,
    pub records: Vec<BondedRecord>,
}

impl ParameterizationRun {
    pub fn records_for(&self, category: Category) -> impl Iterator<Item = &BondedRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }
}

/// Invert and fit every interaction in `samples`.
///
/// Malformed input aborts the run; fits that fail to converge do not and are
/// reported through their record's status.
pub fn parameterize<R: Rng + ?Sized>(
    samples: &SampleSet,
    options: &EngineOptions,
    rng: &mut R,
) -> Result<ParameterizationRun, EngineError> {
    samples.validate()?;
    let driver = FitDriver::new(options.workers)?;
    let mut run = ParameterizationRun::default();

    for category in Category::ALL {
        let increment = options.increments.for_category(category);
        for (index, interaction) in samples.category(category).iter().enumerate() {
            debug!(
                category = category.label(),
                index,
                beads = ?interaction.beads,
                n = interaction.samples.len(),
                "inverting samples"
            );
            let profile = invert(&interaction.samples, increment, options.temperature)?;
            let mut ctx = InteractionContext::new(category, index, interaction, profile);

            match category {
                Category::Bonds => {
                    let fit = ctx.fit_profile(&driver, FunctionalForm::Harmonic, options);
                    let params = equilibrium_for_record(category, &fit.params);
                    ctx.push_record(&mut run, FunctionalForm::Harmonic, &fit, params, false);
                    ctx.fits.push((FunctionalForm::Harmonic, fit));
                }
                Category::Angles | Category::Reb => {
                    let forms: &[(FunctionalForm, bool)] = if category == Category::Angles {
                        &[(FunctionalForm::Harmonic, false), (FunctionalForm::CosineHarmonic, true)]
                    } else {
                        &[(FunctionalForm::RestrictedBending, false)]
                    };
                    for &(form, commented) in forms {
                        let fit = ctx.fit_profile(&driver, form, options);
                        let params = equilibrium_for_record(category, &fit.params);
                        ctx.push_record(&mut run, form, &fit, params, commented);
                        ctx.fits.push((form, fit));
                    }
                }
                Category::Dihedrals => {
                    fit_dihedral(&mut ctx, &mut run, &driver, samples, options, rng)?;
                }
                Category::Impropers => {
                    let fit = ctx.fit_profile(&driver, FunctionalForm::Harmonic, options);
                    let mut params = equilibrium_for_record(category, &fit.params);
                    snap_improper(&mut params, options.improper_tolerance_deg);
                    ctx.push_record(&mut run, FunctionalForm::Harmonic, &fit, params, false);
                    ctx.fits.push((FunctionalForm::Harmonic, fit));
                }
            }

            run.interactions.push(ctx.finish());
        }
    }

    info!(
        interactions = run.interactions.len(),
        records = run.records.len(),
        "parameterization finished"
    );
    Ok(run)
}

fn fit_dihedral<R: Rng + ?Sized>(
    ctx: &mut InteractionContext<'_>,
    run: &mut ParameterizationRun,
    driver: &FitDriver,
    samples: &SampleSet,
    options: &EngineOptions,
    rng: &mut R,
) -> Result<(), EngineError> {
    let policy = PeriodicPolicy {
        max_iterations: options.periodic_iterations,
        max_retries: options.periodic_retries,
    };
    let periodic = fit_simple_periodic(driver, &ctx.profile, policy, rng);
    let comment_periodic = periodic.rmsd() > options.comment_rmsd;
    let params = equilibrium_for_record(ctx.category, &periodic.params);
    ctx.push_record(run, FunctionalForm::SimplePeriodic, &periodic, params, comment_periodic);
    ctx.fits.push((FunctionalForm::SimplePeriodic, periodic));

    let rb = ctx.fit_profile(driver, FunctionalForm::RyckaertBellemans, options);
    ctx.push_record(run, FunctionalForm::RyckaertBellemans, &rb, rb.params.clone(), !comment_periodic);
    ctx.fits.push((FunctionalForm::RyckaertBellemans, rb));

    let angle_beads: Vec<&[usize]> = samples.angles.iter().map(|a| a.beads.as_slice()).collect();
    let Some((first, second)) = adjacent_angles(&ctx.beads, &angle_beads) else {
        info!(
            beads = ?ctx.beads,
            "skipping bending-torsion fit, adjacent angles are not in the input"
        );
        return Ok(());
    };

    let increments = JointIncrements {
        torsion: options.increments.dihedral,
        bend1: options.increments.angle,
        bend2: options.increments.angle,
    };
    let joint = invert_joint(
        ctx.samples,
        &samples.angles[first].samples,
        &samples.angles[second].samples,
        increments,
        options.temperature,
    )?;
    let bt = fit_bending_torsion(driver, &joint, options.max_iterations);
    log_fit(ctx.category, &ctx.beads, FunctionalForm::BendingTorsion, &bt);
    ctx.push_record(run, FunctionalForm::BendingTorsion, &bt, bt.params.clone(), true);
    ctx.fits.push((FunctionalForm::BendingTorsion, bt));
    Ok(())
}

/// Per-interaction state while its forms are being fitted.
struct InteractionContext<'a> {
    category: Category,
    index: usize,
    beads: Vec<usize>,
    samples: &'a [f64],
    profile: FreeEnergyProfile,
    fits: Vec<(FunctionalForm, FitResult)>,
}

impl<'a> InteractionContext<'a> {
    fn new(category: Category, index: usize, interaction: &'a Interaction, profile: FreeEnergyProfile) -> Self {
        Self {
            category,
            index,
            beads: interaction.beads.clone(),
            samples: &interaction.samples,
            profile,
            fits: Vec::new(),
        }
    }

    fn fit_profile(&self, driver: &FitDriver, form: FunctionalForm, options: &EngineOptions) -> FitResult {
        let fit = fit_profile(driver, form, &self.profile, options.max_iterations, options.gradient);
        log_fit(self.category, &self.beads, form, &fit);
        fit
    }

    /// Append a record; failed fits are always commented.
    fn push_record(
        &self,
        run: &mut ParameterizationRun,
        form: FunctionalForm,
        fit: &FitResult,
        params: Vec<f64>,
        commented: bool,
    ) {
        run.records.push(BondedRecord {
            id: self.index,
            category: self.category,
            beads: self.beads.clone(),
            form,
            params,
            rmsd: fit.rmsd(),
            commented: commented || !fit.status.is_converged(),
            status: fit.status,
        });
    }

    fn finish(self) -> InteractionFit {
        InteractionFit {
            category: self.category,
            index: self.index,
            beads: self.beads,
            profile: self.profile,
            fits: self.fits,
        }
    }
}

fn log_fit(category: Category, beads: &[usize], form: FunctionalForm, fit: &FitResult) {
    if fit.status.is_converged() {
        info!(
            category = category.label(),
            ?beads,
            form = form.display_name(),
            params = ?fit.params,
            rmsd = fit.rmsd(),
            "fitted"
        );
    } else {
        warn!(
            category = category.label(),
            ?beads,
            form = form.display_name(),
            status = ?fit.status,
            "fit did not converge"
        );
    }
}

/// Copy of `params` for a record: a leading equilibrium angle is reported
/// in degrees, lengths stay in nm.
fn equilibrium_for_record(category: Category, params: &[f64]) -> Vec<f64> {
    let mut out = params.to_vec();
    if category.is_angular() {
        if let Some(eq) = out.first_mut() {
            *eq = eq.to_degrees();
        }
    }
    out
}

/// Snap an improper equilibrium (degrees) to 180 when within `tolerance` of 180 or 0.
fn snap_improper(params: &mut [f64], tolerance: f64) {
    let eq = params[0];
    if (eq - 180.0).abs() < tolerance || eq.abs() < tolerance {
        info!(from = eq, "improper equilibrium set to 180 degrees");
        params[0] = 180.0;
    } else {
        warn!(
            eq,
            "improper equilibrium is far from 0 and 180 degrees and is left as is"
        );
    }
}
