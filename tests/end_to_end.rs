use std::path::PathBuf;

use bonded_fit::app::pipeline::{run_fit, run_fit_with_samples};
use bonded_fit::data::generate_chain_samples;
use bonded_fit::domain::{
    Category, EngineOptions, FitConfig, FitStatus, FunctionalForm, GAS_CONSTANT, Interaction, SampleSet,
};
use bonded_fit::io::{format_itp, read_records_json, write_itp, write_records_json, write_samples_json};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

fn config(samples: PathBuf, engine: EngineOptions) -> FitConfig {
    FitConfig {
        samples,
        engine,
        seed: Some(11),
        itp: PathBuf::from("unused.itp"),
        export_records: None,
        plot: false,
        plot_width: 72,
        plot_height: 18,
    }
}

fn gaussian_bond(n: usize, mean: f64, sd: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(mean, sd).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

#[test]
fn gaussian_bond_recovers_equilibrium() {
    let mut samples = SampleSet::default();
    samples.bonds.push(Interaction {
        beads: vec![0, 1],
        samples: gaussian_bond(1000, 0.15, 0.005, 3),
    });

    let engine = EngineOptions::default();
    let rt = GAS_CONSTANT * engine.temperature;
    let out = run_fit_with_samples(&config(PathBuf::new(), engine), &samples).unwrap();

    let run = &out.parameterization;
    assert_eq!(run.records.len(), 1);
    let record = &run.records[0];
    assert_eq!(record.form, FunctionalForm::Harmonic);
    assert_eq!(record.status, FitStatus::Converged);
    assert!((record.params[0] - 0.15).abs() < 0.003, "eq = {}", record.params[0]);
    assert!(record.params[1] > 0.0);
    assert!(record.rmsd < rt, "rmsd = {}", record.rmsd);
}

#[test]
fn samples_file_to_topology_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let samples_path = dir.path().join("samples.json");
    let itp_path = dir.path().join("out.itp");
    let records_path = dir.path().join("records.json");

    let mut samples = SampleSet::default();
    samples.bonds.push(Interaction {
        beads: vec![0, 1],
        samples: gaussian_bond(1000, 0.15, 0.005, 5),
    });
    write_samples_json(&samples_path, &samples).unwrap();

    let out = run_fit(&config(samples_path, EngineOptions::default())).unwrap();
    let records = &out.parameterization.records;
    write_itp(&itp_path, records).unwrap();
    write_records_json(&records_path, records, 298.0).unwrap();

    let itp = std::fs::read_to_string(&itp_path).unwrap();
    assert_eq!(itp, format_itp(records));
    assert!(itp.contains("[ bonds ]"));
    assert!(itp.contains("[ constraints ]"));

    let back = read_records_json(&records_path).unwrap();
    assert_eq!(back.records.len(), records.len());
    for (a, b) in back.records.iter().zip(records) {
        assert_eq!((a.category, a.form, a.status), (b.category, b.form, b.status));
        assert_eq!(a.beads, b.beads);
        assert!((a.params[0] - b.params[0]).abs() < 1e-9);
    }
    assert_eq!(back.tool, "bfit");
}

#[test]
fn missing_samples_file_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_fit(&config(dir.path().join("nope.json"), EngineOptions::default())).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn synthetic_chain_produces_every_record_kind() {
    let samples = generate_chain_samples(500, 21).unwrap();
    let engine = EngineOptions {
        periodic_iterations: 2_000,
        periodic_retries: 3,
        ..EngineOptions::default()
    };
    let out = run_fit_with_samples(&config(PathBuf::new(), engine), &samples).unwrap();
    let run = &out.parameterization;

    assert_eq!(run.interactions.len(), 6);
    assert_eq!(run.records_for(Category::Bonds).count(), 3);
    assert_eq!(run.records_for(Category::Angles).count(), 4);

    let dihedral_forms: Vec<FunctionalForm> = run.records_for(Category::Dihedrals).map(|r| r.form).collect();
    assert_eq!(
        dihedral_forms,
        vec![
            FunctionalForm::SimplePeriodic,
            FunctionalForm::RyckaertBellemans,
            FunctionalForm::BendingTorsion,
        ]
    );

    // The joint form is always an alternative.
    assert!(run.records_for(Category::Dihedrals).last().unwrap().commented);

    // Angle equilibria are reported in degrees.
    let harmonic_angle = run
        .records_for(Category::Angles)
        .find(|r| r.form == FunctionalForm::Harmonic)
        .unwrap();
    assert_eq!(harmonic_angle.status, FitStatus::Converged);
    assert!((harmonic_angle.params[0] - 2f64.to_degrees()).abs() < 3.0);
}
