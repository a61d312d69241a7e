//! Read/write sample-set JSON files.
//!
//! The schema is defined by `domain::SampleSet`: one optional array per
//! category, each entry holding zero-based bead indices and the per-frame
//! samples (nm for bonds, radians otherwise).

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::domain::SampleSet;
use crate::error::AppError;

/// Read and validate a sample-set JSON file.
pub fn read_samples_json(path: &Path) -> Result<SampleSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open samples JSON '{}': {e}", path.display())))?;
    let samples: SampleSet = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid samples JSON '{}': {e}", path.display())))?;
    samples.validate()?;

    if samples.interaction_count() == 0 {
        return Err(AppError::new(3, format!("No interactions in '{}'.", path.display())));
    }
    Ok(samples)
}

/// Write a sample-set JSON file.
pub fn write_samples_json(path: &Path, samples: &SampleSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create samples JSON '{}': {e}", path.display())))?;
    serde_json::to_writer(BufWriter::new(file), samples)
        .map_err(|e| AppError::new(2, format!("Failed to write samples JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interaction;
    use std::io::Write;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        let mut samples = SampleSet::default();
        samples.bonds.push(Interaction {
            beads: vec![0, 1],
            samples: vec![0.15, 0.151],
        });
        write_samples_json(&path, &samples).unwrap();
        assert_eq!(read_samples_json(&path).unwrap(), samples);
    }

    #[test]
    fn empty_file_is_no_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let err = read_samples_json(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"bonds\": [").unwrap();
        let err = read_samples_json(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
