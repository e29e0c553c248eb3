//! Batch tooling around the referral engine.
//!
//! Loads patient and hospital feeds from CSV, runs comparisons for many
//! patients in parallel, exports the results, and generates seeded synthetic
//! datasets for benchmarking.
//!
//! ```no_run
//! use referral_core::{EngineConfig, Orchestrator};
//! use referral_experiments::{feeds, runner};
//!
//! let store = feeds::load_store("pacientes.csv", "hospitales.csv")?;
//! let ids = runner::all_patient_ids(&store);
//! let orchestrator = Orchestrator::new(store, EngineConfig::default())?;
//! let batch = runner::run_batch(&orchestrator, &ids, runner::BatchOptions::default())?;
//! referral_experiments::export_to_csv(&batch.reports, "summary.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! - [`feeds`]: CSV record feeds
//! - [`runner`]: parallel batch comparison
//! - [`export`]: JSON and CSV output
//! - [`synthetic`]: random datasets inside a bounding box

pub mod export;
pub mod feeds;
pub mod runner;
pub mod synthetic;

pub use export::{export_to_csv, export_to_json, ExportError};
pub use feeds::FeedError;
pub use runner::{run_batch, BatchOptions, BatchReport};
pub use synthetic::{generate, SyntheticParams};
