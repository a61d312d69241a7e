//! Formatted terminal output.
//!
//! Formatting lives in one place so the math/fitting code stays clean and
//! output changes are localized.

use crate::domain::{Category, FitConfig, FitResult, FitStatus, FunctionalForm};
use crate::fit::{InteractionFit, ParameterizationRun};

/// Format the full run summary (settings + per-interaction fits).
///
/// Parameters are shown as fitted (angles in radians); the topology fragment
/// carries the converted values.
pub fn format_run_summary(run: &ParameterizationRun, config: &FitConfig) -> String {
    let engine = &config.engine;
    let inc = &engine.increments;
    let mut out = String::new();

    out.push_str("=== bfit - Boltzmann inversion bonded parameters ===\n");
    out.push_str(&format!("Samples: {}\n", config.samples.display()));
    out.push_str(&format!("Temperature: {:.2} K\n", engine.temperature));
    out.push_str(&format!(
        "Increments: bond={:.4} nm | angle={:.2} deg | reb={:.2} deg | dihedral={:.2} deg | improper={:.2} deg\n",
        inc.bond,
        inc.angle.to_degrees(),
        inc.reb.to_degrees(),
        inc.dihedral.to_degrees(),
        inc.improper.to_degrees(),
    ));
    out.push_str("Energies in kJ/mol, distances in nm, angles in radians\n");

    for category in Category::ALL {
        let fits: Vec<&InteractionFit> = run
            .interactions
            .iter()
            .filter(|f| f.category == category)
            .collect();
        if fits.is_empty() {
            continue;
        }
        out.push_str(&format!("\n[{}] n={}\n", category.label(), fits.len()));
        for fit in fits {
            out.push_str(&format!(
                "- beads {} | bins={}\n",
                fmt_beads(&fit.beads),
                fit.profile.len()
            ));
            for (form, result) in &fit.fits {
                out.push_str(&format_fit_line(*form, result));
            }
        }
    }

    let failed = run
        .records
        .iter()
        .filter(|r| !r.status.is_converged())
        .count();
    out.push_str(&format!(
        "\nRecords: {} ({} not converged)\n",
        run.records.len(),
        failed
    ));

    out
}

fn format_fit_line(form: FunctionalForm, fit: &FitResult) -> String {
    let status = match fit.status {
        FitStatus::Converged => "",
        FitStatus::MinimizerFailed => " [minimizer failed]",
        FitStatus::ImplausiblePeriodicity => " [no plausible periodicity]",
    };
    format!(
        "    {:<20} RMSD={:>10.3} params={}{status}\n",
        form.display_name(),
        fit.rmsd(),
        fmt_vec(&fit.params)
    )
}

fn fmt_beads(beads: &[usize]) -> String {
    beads
        .iter()
        .map(|b| (b + 1).to_string())
        .collect::<Vec<_>>()
        .join("-")
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::domain::{EngineOptions, FreeEnergyProfile};

    fn config() -> FitConfig {
        FitConfig {
            samples: PathBuf::from("samples.json"),
            engine: EngineOptions::default(),
            seed: None,
            itp: PathBuf::from("gmx_out.itp"),
            export_records: None,
            plot: false,
            plot_width: 72,
            plot_height: 18,
        }
    }

    #[test]
    fn summary_lists_every_fit() {
        let run = ParameterizationRun {
            interactions: vec![InteractionFit {
                category: Category::Dihedrals,
                index: 0,
                beads: vec![0, 1, 2, 3],
                profile: FreeEnergyProfile {
                    coords: vec![0.0, 0.1],
                    energies: vec![0.0, 1.0],
                },
                fits: vec![
                    (FunctionalForm::SimplePeriodic, FitResult::implausible_periodicity(3)),
                    (FunctionalForm::RyckaertBellemans, FitResult::converged(vec![1.0; 6], 0.005)),
                ],
            }],
            records: Vec::new(),
        };
        let text = format_run_summary(&run, &config());
        assert!(text.contains("Temperature: 298.00 K"));
        assert!(text.contains("angle=1.00 deg"));
        assert!(text.contains("[dihedrals] n=1"));
        assert!(text.contains("- beads 1-2-3-4 | bins=2"));
        assert!(text.contains("[no plausible periodicity]"));
        assert!(text.contains("RMSD=     0.100"));
        assert!(!text.contains("[bonds]"));
    }
}
