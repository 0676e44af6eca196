//! Export the aligned table to CSV or JSON.
//!
//! Column names follow `AlignedRecord`'s serde names, so the CSV opens in a
//! spreadsheet with the same headers the dashboard table shows.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{AlignedTable, ExportFormat};
use crate::error::{AppError, EXIT_INPUT};

/// Write the aligned table to `path` in the requested format.
pub fn write_aligned(path: &Path, table: &AlignedTable, format: ExportFormat) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create export file '{}': {e}", path.display())))?;

    match format {
        ExportFormat::Csv => write_aligned_csv(file, table)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV: {e}"))),
        ExportFormat::Json => serde_json::to_writer_pretty(file, table)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export JSON: {e}"))),
    }
}

/// Header row, matching `AlignedRecord`'s serde names.
const CSV_HEADER: [&str; 3] = ["Year", "Global CO2 Emissions", "Temperature_Anomaly"];

/// Serialize the aligned table as CSV into any writer.
///
/// An empty table still gets its header row.
pub fn write_aligned_csv<W: Write>(writer: W, table: &AlignedTable) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    // serde only emits the header alongside the first record.
    if table.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    for record in table.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
