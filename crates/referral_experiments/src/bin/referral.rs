//! Command-line front end for the referral engine. Reports are printed to
//! stdout as JSON; logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use referral_core::graph::GraphPolicy;
use referral_core::matching::AssignmentAlgorithmKind;
use referral_core::records::InMemoryStore;
use referral_core::specialty::KeywordResolver;
use referral_core::{EngineConfig, Orchestrator};
use referral_experiments::export::{export_to_csv, export_to_json, write_json};
use referral_experiments::feeds;
use referral_experiments::runner::{self, BatchOptions};
use referral_experiments::synthetic::{self, SyntheticParams};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "referral",
    about = "Compare patient-to-hospital assignment and graph algorithms"
)]
struct Cli {
    /// Patient feed (CSV)
    #[arg(long, global = true, env = "REFERRAL_PATIENTS")]
    patients: Option<PathBuf>,

    /// Hospital feed (CSV)
    #[arg(long, global = true, env = "REFERRAL_HOSPITALS")]
    hospitals: Option<PathBuf>,

    /// Engine configuration (JSON); flags below override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Graph policy for the cached proximity graph
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyKind>,

    /// Neighbour count for knn policies
    #[arg(long, global = true)]
    k: Option<usize>,

    /// Radius in km for the radius policy
    #[arg(long, global = true)]
    radius_km: Option<f64>,

    /// Run assignment and network groups concurrently
    #[arg(long, global = true)]
    parallel: bool,

    /// Disease keyword to specialty rule, e.g. `infarto=Cardiología` (repeatable)
    #[arg(long = "specialty-rule", global = true, value_parser = parse_rule)]
    specialty_rules: Vec<(String, String)>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cached graph's nodes and undirected edges
    Graph,
    /// Build every graph policy over the same snapshot and compare them
    CompareGraphs,
    /// Run every algorithm family for one patient
    Patient {
        /// Patient id
        id: String,
    },
    /// Pick one final hospital for a patient (min-cost flow, then Hungarian, then greedy)
    Best {
        /// Patient id
        id: String,
    },
    /// Run one assignment algorithm over every record and print its assignments
    Assign {
        #[arg(long, value_enum, default_value_t = AlgorithmArg::MinCostFlow)]
        algorithm: AlgorithmArg,
    },
    /// Compare shortest paths, global assignment and network flow between two nodes
    Between { start: String, end: String },
    /// Minimum spanning tree of the cached graph
    Mst {
        /// Use Prim rooted at this node instead of Kruskal
        #[arg(long)]
        prim: Option<String>,
    },
    /// Unit-capacity max flow between two nodes
    MaxFlow { source: String, sink: String },
    /// Compare many patients in parallel
    Batch {
        /// Patient ids; every patient in the feed when omitted
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Worker threads (rayon default when omitted)
        #[arg(long)]
        threads: Option<usize>,
        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
        /// Write full reports as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,
        /// Write a flat per-algorithm CSV summary
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Write a seeded synthetic dataset as CSV feeds
    Synthetic {
        /// Output directory for pacientes.csv and hospitales.csv
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 100)]
        num_patients: usize,
        #[arg(long, default_value_t = 20)]
        num_hospitals: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 5)]
        max_capacity: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    Knn,
    Radius,
    BipartiteKnn,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Greedy,
    Hungarian,
    MinCostFlow,
}

impl From<AlgorithmArg> for AssignmentAlgorithmKind {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Greedy => AssignmentAlgorithmKind::Greedy,
            AlgorithmArg::Hungarian => AssignmentAlgorithmKind::Hungarian,
            AlgorithmArg::MinCostFlow => AssignmentAlgorithmKind::MinCostFlow,
        }
    }
}

fn parse_rule(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=').map(|(k, s)| (k.trim(), s.trim())) {
        Some((keyword, specialty)) if !keyword.is_empty() && !specialty.is_empty() => {
            Ok((keyword.to_string(), specialty.to_string()))
        }
        _ => Err(format!("expected KEYWORD=SPECIALTY, got `{raw}`")),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(radius_km) = cli.radius_km {
        config = config.with_default_radius_km(radius_km);
    }
    let k = cli.k.unwrap_or(GraphPolicy::DEFAULT_K);
    let policy = match cli.policy {
        Some(PolicyKind::Knn) => Some(GraphPolicy::Knn { k }),
        Some(PolicyKind::BipartiteKnn) => Some(GraphPolicy::BipartiteKnn { k }),
        Some(PolicyKind::Radius) => Some(GraphPolicy::Radius {
            radius_km: config.default_radius_km,
        }),
        None => None,
    };
    if let Some(policy) = policy {
        config = config.with_graph_policy(policy);
    }
    if cli.parallel {
        config = config.with_parallel(true);
    }
    Ok(config)
}

fn load_store(cli: &Cli) -> Result<InMemoryStore> {
    let (Some(patients), Some(hospitals)) = (&cli.patients, &cli.hospitals) else {
        bail!("--patients and --hospitals are required for this command");
    };
    feeds::load_store(patients, hospitals).context("failed to load record feeds")
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator<InMemoryStore>> {
    let config = load_config(cli)?;
    let store = load_store(cli)?;
    let orchestrator = Orchestrator::new(store, config).context("invalid engine configuration")?;
    Ok(if cli.specialty_rules.is_empty() {
        orchestrator
    } else {
        orchestrator.with_resolver(KeywordResolver::new(cli.specialty_rules.clone()))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    write_json(value, std::io::stdout().lock()).context("failed to write report")
}

fn write_synthetic(out_dir: &Path, params: &SyntheticParams) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let (patients, hospitals) = synthetic::generate(params);

    let patients_path = out_dir.join("pacientes.csv");
    let file = fs::File::create(&patients_path)
        .with_context(|| format!("failed to create {}", patients_path.display()))?;
    feeds::write_patients(file, &patients)?;

    let hospitals_path = out_dir.join("hospitales.csv");
    let file = fs::File::create(&hospitals_path)
        .with_context(|| format!("failed to create {}", hospitals_path.display()))?;
    feeds::write_hospitals(file, &hospitals)?;

    info!(
        patients = patients.len(),
        hospitals = hospitals.len(),
        dir = %out_dir.display(),
        "synthetic dataset written"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Synthetic {
            out_dir,
            num_patients,
            num_hospitals,
            seed,
            max_capacity,
        } => {
            let params = SyntheticParams::default()
                .with_patients(*num_patients)
                .with_hospitals(*num_hospitals)
                .with_seed(*seed)
                .with_max_capacity(*max_capacity);
            write_synthetic(out_dir, &params)
        }
        Commands::Graph => print_json(&build_orchestrator(&cli)?.graph_view()?),
        Commands::CompareGraphs => {
            print_json(&build_orchestrator(&cli)?.compare_graph_policies()?)
        }
        Commands::Patient { id } => print_json(&build_orchestrator(&cli)?.compare_for_patient(id)?),
        Commands::Best { id } => {
            print_json(&build_orchestrator(&cli)?.best_assignment_for_patient(id)?)
        }
        Commands::Assign { algorithm } => {
            print_json(&build_orchestrator(&cli)?.assign_all((*algorithm).into()))
        }
        Commands::Between { start, end } => {
            print_json(&build_orchestrator(&cli)?.compare_between(start, end)?)
        }
        Commands::Mst { prim } => {
            let orchestrator = build_orchestrator(&cli)?;
            let report = match prim {
                Some(start) => orchestrator.mst_prim(start)?,
                None => orchestrator.mst_kruskal()?,
            };
            print_json(&report)
        }
        Commands::MaxFlow { source, sink } => {
            print_json(&build_orchestrator(&cli)?.max_flow(source, sink)?)
        }
        Commands::Batch {
            ids,
            threads,
            no_progress,
            json_out,
            csv_out,
        } => {
            let orchestrator = build_orchestrator(&cli)?;
            let ids = if ids.is_empty() {
                runner::all_patient_ids(orchestrator.store())
            } else {
                ids.clone()
            };
            let options = BatchOptions {
                threads: *threads,
                show_progress: !no_progress,
            };
            let batch = runner::run_batch(&orchestrator, &ids, options)?;

            if let Some(path) = json_out {
                export_to_json(&batch, path)
                    .with_context(|| format!("failed to export {}", path.display()))?;
            }
            if let Some(path) = csv_out {
                export_to_csv(&batch.reports, path)
                    .with_context(|| format!("failed to export {}", path.display()))?;
            }

            #[derive(Serialize)]
            struct BatchSummary<'a> {
                patients: usize,
                failures: &'a [runner::BatchFailure],
                assignment: Vec<runner::AssignmentSummary>,
                timings: &'a referral_core::timing::AlgorithmTimings,
                wall_ms: f64,
            }
            print_json(&BatchSummary {
                patients: batch.reports.len(),
                failures: &batch.failures,
                assignment: batch.assignment_summaries(),
                timings: &batch.timings,
                wall_ms: batch.wall_ms.as_ms(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialty_rules_need_both_sides() {
        assert_eq!(
            parse_rule("infarto = Cardiología").unwrap(),
            ("infarto".to_string(), "Cardiología".to_string())
        );
        assert!(parse_rule("infarto").is_err());
        assert!(parse_rule("=Cardiología").is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "referral",
            "--policy",
            "radius",
            "--radius-km",
            "12.5",
            "--parallel",
            "compare-graphs",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.graph_policy, GraphPolicy::Radius { radius_km: 12.5 });
        assert!(config.parallel);
    }

    #[test]
    fn assign_accepts_kebab_case_algorithms() {
        let cli = Cli::parse_from(["referral", "assign", "--algorithm", "min-cost-flow"]);
        match cli.command {
            Commands::Assign { algorithm } => assert_eq!(
                AssignmentAlgorithmKind::from(algorithm),
                AssignmentAlgorithmKind::MinCostFlow
            ),
            _ => panic!("expected the assign subcommand"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
