//! Export fitted records as JSON.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{BondedRecord, RecordsFile};
use crate::error::AppError;

/// Write records to a JSON file (schema: `domain::RecordsFile`).
pub fn write_records_json(path: &Path, records: &[BondedRecord], temperature: f64) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create records JSON '{}': {e}", path.display())))?;

    let out = RecordsFile {
        tool: "bfit".to_string(),
        generated_at: Utc::now(),
        temperature,
        records: records.to_vec(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write records JSON: {e}")))?;
    Ok(())
}

/// Read a records JSON file.
pub fn read_records_json(path: &Path) -> Result<RecordsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open records JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid records JSON: {e}")))
}
