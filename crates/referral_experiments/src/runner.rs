//! Parallel batch comparison over many patients using rayon.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use referral_core::records::RecordStore;
use referral_core::report::ComparisonReport;
use referral_core::timing::{timed, AlgorithmTimings, Elapsed};
use referral_core::Orchestrator;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid progress template: {0}")]
    Progress(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Worker threads; rayon's default when `None`.
    pub threads: Option<usize>,
    pub show_progress: bool,
}

/// A patient whose comparison could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub patient_id: String,
    pub error: String,
}

/// Per-algorithm assignment totals across a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentSummary {
    pub algorithm: String,
    pub assigned: usize,
    pub unassigned: usize,
    pub mean_geo_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Successful reports in input order.
    pub reports: Vec<ComparisonReport>,
    pub failures: Vec<BatchFailure>,
    pub timings: AlgorithmTimings,
    pub wall_ms: Elapsed,
}

impl BatchReport {
    pub fn assignment_summaries(&self) -> Vec<AssignmentSummary> {
        summarize(&self.reports)
    }
}

/// Timings of every algorithm entry in one report.
pub fn report_timings(report: &ComparisonReport) -> AlgorithmTimings {
    let mut timings = AlgorithmTimings::default();
    for entry in &report.assignment_algorithms {
        timings.record(&entry.info.algorithm, entry.elapsed_ms);
        if let Some(paths) = &entry.paths {
            timings.record(&paths.dijkstra.info.algorithm, paths.dijkstra.elapsed_ms);
            timings.record(&paths.bellman_ford.info.algorithm, paths.bellman_ford.elapsed_ms);
        }
    }
    for entry in &report.network_algorithms {
        timings.record(&entry.info.algorithm, entry.elapsed_ms);
    }
    timings
}

pub fn summarize(reports: &[ComparisonReport]) -> Vec<AssignmentSummary> {
    let mut summaries: Vec<AssignmentSummary> = Vec::new();
    let mut distance_sums: Vec<f64> = Vec::new();

    for report in reports {
        for entry in &report.assignment_algorithms {
            let idx = match summaries
                .iter()
                .position(|s| s.algorithm == entry.info.algorithm)
            {
                Some(idx) => idx,
                None => {
                    summaries.push(AssignmentSummary {
                        algorithm: entry.info.algorithm.clone(),
                        assigned: 0,
                        unassigned: 0,
                        mean_geo_distance_km: None,
                    });
                    distance_sums.push(0.0);
                    summaries.len() - 1
                }
            };
            match entry.geo_distance_km {
                Some(km) if entry.hospital.is_some() => {
                    summaries[idx].assigned += 1;
                    distance_sums[idx] += km;
                }
                _ => summaries[idx].unassigned += 1,
            }
        }
    }

    for (summary, sum) in summaries.iter_mut().zip(distance_sums) {
        if summary.assigned > 0 {
            summary.mean_geo_distance_km = Some(sum / summary.assigned as f64);
        }
    }
    summaries
}

fn progress_bar(total: usize) -> Result<ProgressBar, RunnerError> {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| RunnerError::Progress(e.to_string()))?
    .progress_chars("#>-");
    let bar = ProgressBar::new(total as u64);
    bar.set_style(style);
    Ok(bar)
}

/// Compare every patient in `patient_ids` in parallel.
///
/// Unknown ids and other per-patient errors are collected as failures rather
/// than aborting the batch. The graph is built once, before workers start.
pub fn run_batch<S: RecordStore>(
    orchestrator: &Orchestrator<S>,
    patient_ids: &[String],
    options: BatchOptions,
) -> Result<BatchReport, RunnerError> {
    let total = patient_ids.len();
    let pb = if options.show_progress && total > 0 {
        Some(progress_bar(total)?)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    if let Err(err) = orchestrator.graph() {
        warn!(error = %err, "graph build failed; per-patient reports will fail");
    }

    let (outcomes, wall_ms) = timed(|| {
        pool.install(|| {
            patient_ids
                .par_iter()
                .map(|id| {
                    let outcome = orchestrator.compare_for_patient(id);
                    if let Some(bar) = &pb {
                        bar.inc(1);
                    }
                    (id, outcome)
                })
                .collect::<Vec<_>>()
        })
    });

    if let Some(bar) = &pb {
        bar.finish_with_message("Completed");
    }

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    let mut timings = AlgorithmTimings::default();
    for (id, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                timings.merge(&report_timings(&report));
                reports.push(report);
            }
            Err(err) => failures.push(BatchFailure {
                patient_id: id.clone(),
                error: err.to_string(),
            }),
        }
    }

    info!(
        patients = total,
        failed = failures.len(),
        wall_ms = wall_ms.as_ms(),
        "batch comparison finished"
    );

    Ok(BatchReport {
        reports,
        failures,
        timings,
        wall_ms,
    })
}

/// Every patient id in the store, in feed order.
pub fn all_patient_ids(store: &impl RecordStore) -> Vec<String> {
    store.patients().into_iter().map(|p| p.id).collect()
}
