//! GROMACS topology fragment (`.itp`) emission.
//!
//! Layout:
//! - `[ bonds ]`: harmonic bonds; stiff ones (`k >= 25000`) commented, very
//!   stiff ones (`k >= 50000`) omitted
//! - `[ constraints ]`: the same bonds as constraints; soft ones
//!   (`k < 25000`) commented, very soft ones (`k < 20000`) omitted
//! - `[ angles ]`: harmonic angles, then the cosine-harmonic alternatives
//! - `[ angles ]`: restricted bending
//! - `[ dihedrals ]`: simple periodic, then Ryckaert-Bellemans, then combined
//!   bending-torsion, then impropers
//!
//! Commented records are prefixed with `;;`. Bead indices are printed 1-based.

use std::fs;
use std::path::Path;

use crate::domain::{BondedRecord, Category, FunctionalForm};
use crate::error::AppError;

/// Bonds softer than this are not emitted as constraints.
pub const CONSTRAINT_OMIT_BELOW: f64 = 20_000.0;
/// Boundary between bonds (below) and constraints (at or above).
pub const CONSTRAINT_THRESHOLD: f64 = 25_000.0;
/// Bonds at least this stiff are not emitted as bonds.
pub const BOND_OMIT_ABOVE: f64 = 50_000.0;

/// Write the topology fragment for `records` to `path`.
pub fn write_itp(path: &Path, records: &[BondedRecord]) -> Result<(), AppError> {
    fs::write(path, format_itp(records))
        .map_err(|e| AppError::new(2, format!("Failed to write topology '{}': {e}", path.display())))
}

/// Render the topology fragment for `records`.
pub fn format_itp(records: &[BondedRecord]) -> String {
    let of = |category: Category, form: FunctionalForm| {
        records
            .iter()
            .filter(move |r| r.category == category && r.form == form)
    };

    let mut out = String::new();
    out.push_str("; Bonded parameters by bfit (Boltzmann inversion)\n");
    out.push_str("; Energies in kJ/mol, distances in nm, angles in degrees\n");

    out.push_str("[ bonds ]\n; i j  funct    length   force.c.\n");
    for r in of(Category::Bonds, FunctionalForm::Harmonic) {
        let k = r.params[1];
        if k >= BOND_OMIT_ABOVE {
            continue;
        }
        let extra = if k >= CONSTRAINT_THRESHOLD { ";" } else { "" };
        out.push_str(&format!(
            "{}{extra}{:>3} {:<3} 1      {:5.3}     {:8.2} ; rmsd: {:8.2}\n",
            prefix(r),
            r.beads[0] + 1,
            r.beads[1] + 1,
            r.params[0],
            k,
            r.rmsd
        ));
    }

    out.push_str("[ constraints ]\n; i j  funct    length\n");
    for r in of(Category::Bonds, FunctionalForm::Harmonic) {
        let k = r.params[1];
        if k < CONSTRAINT_OMIT_BELOW {
            continue;
        }
        let extra = if k < CONSTRAINT_THRESHOLD { ";" } else { "" };
        out.push_str(&format!(
            "{}{extra}{:>3} {:<3} 1      {:5.3} ; k: {:8.2} rmsd: {:8.2}\n",
            prefix(r),
            r.beads[0] + 1,
            r.beads[1] + 1,
            r.params[0],
            k,
            r.rmsd
        ));
    }

    out.push_str("[ angles ]\n; i     j       k       funct   angle   force_constant\n");
    for r in of(Category::Angles, FunctionalForm::Harmonic) {
        out.push_str(&angle_line(r, ""));
    }
    for r in of(Category::Angles, FunctionalForm::CosineHarmonic) {
        out.push_str(&angle_line(r, "Harmonic-Cos (Gromos96) potential "));
    }

    out.push_str("[ angles ]\n; i     j       k       funct   angle   force_constant\n; ReB\n");
    for r in of(Category::Reb, FunctionalForm::RestrictedBending) {
        out.push_str(&angle_line(r, ""));
    }

    out.push_str("[ dihedrals ]\n; i     j       k    l       funct   phase       kd    pn\n");
    for r in of(Category::Dihedrals, FunctionalForm::SimplePeriodic) {
        let p = &r.params;
        out.push_str(&format!(
            "{}{}     {:>2}     {:5.2}  {:8.2}   {} ; rmsd: {:8.2}\n",
            prefix(r),
            quad(&r.beads),
            FunctionalForm::SimplePeriodic.gromacs_funct(r.category),
            p[0],
            p[1],
            p[2].round() as i64,
            r.rmsd
        ));
    }
    for r in of(Category::Dihedrals, FunctionalForm::RyckaertBellemans) {
        out.push_str(&coefficient_line(r, "Ryckaert-Bellemans potential."));
    }
    for r in of(Category::Dihedrals, FunctionalForm::BendingTorsion) {
        out.push_str(&coefficient_line(r, "Combined bending-torsion potential."));
    }

    out.push_str("; Improper\n; i     j       k    l       funct   angle       kd\n");
    for r in of(Category::Impropers, FunctionalForm::Harmonic) {
        out.push_str(&format!(
            "{}{}     {:>2}     {:5.2}  {:8.2} ; rmsd: {:8.2}\n",
            prefix(r),
            quad(&r.beads),
            r.form.gromacs_funct(r.category),
            r.params[0],
            r.params[1],
            r.rmsd
        ));
    }

    out
}

fn prefix(r: &BondedRecord) -> &'static str {
    if r.commented { ";;" } else { "" }
}

fn angle_line(r: &BondedRecord, note: &str) -> String {
    format!(
        "{}{:>3}     {:<3}     {:<3}       {:>2}     {:5.2}  {:8.2} ; {note}rmsd: {:8.2}\n",
        prefix(r),
        r.beads[0] + 1,
        r.beads[1] + 1,
        r.beads[2] + 1,
        r.form.gromacs_funct(r.category),
        r.params[0],
        r.params[1],
        r.rmsd
    )
}

fn coefficient_line(r: &BondedRecord, note: &str) -> String {
    let coeffs: Vec<String> = r.params.iter().map(|c| format!("{c:5.2}")).collect();
    format!(
        "{}{}     {:>2}     {} ;; {note} rmsd: {:8.2}\n",
        prefix(r),
        quad(&r.beads),
        r.form.gromacs_funct(r.category),
        coeffs.join(" "),
        r.rmsd
    )
}

fn quad(beads: &[usize]) -> String {
    format!(
        "{:>3}     {:<3}     {:<3}  {:<3}",
        beads[0] + 1,
        beads[1] + 1,
        beads[2] + 1,
        beads[3] + 1
    )
}
