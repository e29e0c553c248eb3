//! Report export to JSON and a flat CSV summary.

use std::io::Write;
use std::path::{Path, PathBuf};

use referral_core::report::ComparisonReport;
use serde::Serialize;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no reports to export")]
    Empty,
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Write any serializable report as pretty JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(value: &T, writer: impl Write) -> Result<(), ExportError> {
    json::write_json_impl(value, writer)
}

/// Export `value` as pretty JSON to `path`.
pub fn export_to_json<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    json::write_json_impl(value, file)
}

/// Write one CSV row per patient and assignment algorithm.
///
/// Columns: `patient_id, department, specialty_required, candidate_tier,
/// candidate_count, algorithm, elapsed_ms, hospital_id, geo_distance_km,
/// dijkstra_km, bellman_ford_km`. Missing values are empty cells.
pub fn write_csv(reports: &[ComparisonReport], writer: impl Write) -> Result<(), ExportError> {
    writer_utils::ensure_not_empty(reports)?;
    csv::write_csv_impl(reports, writer)
}

pub fn export_to_csv(
    reports: &[ComparisonReport],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    writer_utils::ensure_not_empty(reports)?;
    let file = writer_utils::create_output_file(path)?;
    csv::write_csv_impl(reports, file)
}
