//! Command-line parsing for the bonded-parameter fitter.
//!
//! Argument parsing and dispatch live here and in `app`; nothing in this
//! module touches the fitting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bfit",
    version,
    about = "Boltzmann inversion and bonded parameter fitting for coarse-grained models"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit bonded potentials to a sample set and write a topology fragment.
    Fit(FitArgs),
    /// Write a synthetic sample set for a four-bead chain.
    Synth(SynthArgs),
}

/// Options for `bfit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Sample-set JSON (bonds in nm, angles in radians).
    #[arg(value_name = "SAMPLES")]
    pub samples: PathBuf,

    /// Temperature (K).
    #[arg(long, default_value_t = 298.0)]
    pub temperature: f64,

    /// Histogram increment for bonds (nm).
    #[arg(long, default_value_t = 0.001)]
    pub bond_increment: f64,

    /// Histogram increment for angles and restricted-bending angles (degrees).
    #[arg(long, default_value_t = 1.0)]
    pub angle_increment: f64,

    /// Histogram increment for dihedrals (degrees).
    #[arg(long, default_value_t = 10.0)]
    pub dihedral_increment: f64,

    /// Histogram increment for impropers (degrees).
    #[arg(long, default_value_t = 1.0)]
    pub improper_increment: f64,

    /// Iteration budget per fit; 0 or negative uses the large default.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub max_iterations: i64,

    /// Iteration budget per simple-periodic fit.
    #[arg(long, default_value_t = 10_000)]
    pub periodic_iterations: i64,

    /// Restarts allowed for a simple-periodic fit.
    #[arg(long, default_value_t = 30)]
    pub periodic_retries: usize,

    /// Worker threads for finite differences.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Seed for periodic restart perturbations (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comment out periodic dihedrals whose RMSD exceeds this (kJ/mol).
    #[arg(long, default_value_t = 10.0)]
    pub comment_rmsd: f64,

    /// Snap improper equilibria within this many degrees of 0/180 to 180.
    #[arg(long, default_value_t = 10.0)]
    pub improper_tolerance: f64,

    /// Use the closed-form gradient for harmonic fits.
    #[arg(long)]
    pub analytic_harmonic_gradient: bool,

    /// Topology fragment output.
    #[arg(long, default_value = "gmx_out.itp")]
    pub itp: PathBuf,

    /// Export fitted records to JSON.
    #[arg(long = "export-records", value_name = "JSON")]
    pub export_records: Option<PathBuf>,

    /// Render an ASCII plot per fitted form.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,
}

/// Options for `bfit synth`.
#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output sample-set JSON.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Samples per interaction.
    #[arg(long, default_value_t = 5000)]
    pub frames: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
