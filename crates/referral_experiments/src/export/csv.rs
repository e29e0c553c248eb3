use std::io::Write;

use referral_core::report::{AssignmentEntry, ComparisonReport};
use serde::Serialize;

use super::ExportError;

/// One row per patient and assignment algorithm.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    patient_id: &'a str,
    department: Option<&'a str>,
    specialty_required: &'a str,
    candidate_tier: &'static str,
    candidate_count: usize,
    algorithm: &'a str,
    elapsed_ms: f64,
    hospital_id: Option<&'a str>,
    geo_distance_km: Option<f64>,
    dijkstra_km: Option<f64>,
    bellman_ford_km: Option<f64>,
}

fn row<'a>(report: &'a ComparisonReport, entry: &'a AssignmentEntry) -> SummaryRow<'a> {
    let paths = entry.paths.as_ref();
    SummaryRow {
        patient_id: &report.patient.id,
        department: report.patient.department.as_deref(),
        specialty_required: &report.specialty_required,
        candidate_tier: report.candidate_tier.as_str(),
        candidate_count: report.candidate_count,
        algorithm: &entry.info.algorithm,
        elapsed_ms: entry.elapsed_ms.as_ms(),
        hospital_id: entry.hospital.as_ref().map(|h| h.id.as_str()),
        geo_distance_km: entry.geo_distance_km,
        dijkstra_km: paths.and_then(|p| p.dijkstra.result.distance_km()),
        bellman_ford_km: paths.and_then(|p| p.bellman_ford.result.distance_km()),
    }
}

pub(crate) fn write_csv_impl(
    reports: &[ComparisonReport],
    writer: impl Write,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for report in reports {
        for entry in &report.assignment_algorithms {
            wtr.serialize(row(report, entry))?;
        }
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
