//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - reads the sample set and runs the parameterization
//! - prints the summary and optional plots
//! - writes the topology fragment and optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FitArgs, SynthArgs};
use crate::domain::{EngineOptions, FitConfig, FunctionalForm, GradientMode, Increments};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `bfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_run_summary(&run.parameterization, &config));

    if config.plot {
        for interaction in &run.parameterization.interactions {
            for (form, fit) in &interaction.fits {
                // The joint form has no 1-D curve to draw.
                if *form == FunctionalForm::BendingTorsion {
                    continue;
                }
                println!(
                    "{} #{}",
                    interaction.category.label(),
                    interaction.index + 1
                );
                println!(
                    "{}",
                    crate::plot::render_fit_plot(
                        &interaction.profile,
                        *form,
                        &fit.params,
                        config.plot_width,
                        config.plot_height,
                    )
                );
            }
        }
    }

    crate::io::write_itp(&config.itp, &run.parameterization.records)?;
    info!(path = %config.itp.display(), "wrote topology fragment");

    if let Some(path) = &config.export_records {
        crate::io::write_records_json(path, &run.parameterization.records, config.engine.temperature)?;
        info!(path = %path.display(), "wrote records");
    }

    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let samples = crate::data::generate_chain_samples(args.frames, args.seed)?;
    crate::io::write_samples_json(&args.out, &samples)?;
    info!(
        path = %args.out.display(),
        interactions = samples.interaction_count(),
        "wrote synthetic samples"
    );
    Ok(())
}

/// Build a run configuration from parsed arguments; angular increments are
/// converted from degrees to radians here.
pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let increments = Increments {
        bond: args.bond_increment,
        angle: args.angle_increment.to_radians(),
        reb: args.angle_increment.to_radians(),
        dihedral: args.dihedral_increment.to_radians(),
        improper: args.improper_increment.to_radians(),
    };

    FitConfig {
        samples: args.samples.clone(),
        engine: EngineOptions {
            temperature: args.temperature,
            increments,
            max_iterations: args.max_iterations,
            periodic_iterations: args.periodic_iterations,
            periodic_retries: args.periodic_retries,
            workers: args.workers,
            comment_rmsd: args.comment_rmsd,
            improper_tolerance_deg: args.improper_tolerance,
            gradient: if args.analytic_harmonic_gradient {
                GradientMode::Analytic
            } else {
                GradientMode::FiniteDifference
            },
        },
        seed: args.seed,
        itp: args.itp.clone(),
        export_records: args.export_records.clone(),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}
