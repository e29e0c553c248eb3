//! Per-patient and pairwise algorithm comparisons over the cached proximity
//! graph.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::cache::GraphCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::graph::{self, Graph, GraphPolicy};
use crate::matching::{total_distance_km, Assignment, AssignmentAlgorithm, AssignmentAlgorithmKind};
use crate::network::{edmonds_karp, kruskal, prim, CapacityNetwork};
use crate::paths::{bellman_ford, dijkstra, floyd_warshall};
use crate::records::{HospitalRecord, PatientRecord, RecordStore};
use crate::report::{
    AlgorithmCategory, AlgorithmInfo, AssignmentEntry, BatchAssignment, BatchAssignmentEntry,
    BestAssignment, CandidateTier, ComparisonReport, GraphPolicyComparison, GraphView, MstReport,
    NetworkEntry, PairComparison, PathEntry, PathPair, PatientSummary, PolicyStats,
};
use crate::specialty::{NoInference, SpecialtyResolver};
use crate::timing::{timed, Elapsed};

/// Filter `hospitals` down to the candidates for `patient`.
///
/// Tiers, first non-empty wins: same department offering `specialty`, then
/// same department, then every hospital. A patient without a department
/// searches all hospitals for the specialty and otherwise falls straight to
/// the nationwide tier.
pub fn select_candidates(
    patient: &PatientRecord,
    specialty: &str,
    hospitals: &[HospitalRecord],
) -> (CandidateTier, Vec<HospitalRecord>) {
    let in_department: Vec<&HospitalRecord> = match patient.department.as_deref() {
        Some(department) => hospitals
            .iter()
            .filter(|h| h.department.as_deref() == Some(department))
            .collect(),
        None => hospitals.iter().collect(),
    };

    let with_specialty: Vec<HospitalRecord> = in_department
        .iter()
        .filter(|h| h.offers(specialty))
        .map(|h| (*h).clone())
        .collect();
    if !with_specialty.is_empty() {
        return (CandidateTier::DepartmentAndSpecialty, with_specialty);
    }

    if patient.department.is_some() && !in_department.is_empty() {
        let same_department = in_department.into_iter().cloned().collect();
        return (CandidateTier::Department, same_department);
    }

    (CandidateTier::Nationwide, hospitals.to_vec())
}

/// Composes comparison reports from a record store and a cached graph.
pub struct Orchestrator<S> {
    store: S,
    config: EngineConfig,
    resolver: Box<dyn SpecialtyResolver>,
    cache: GraphCache,
}

impl<S: RecordStore> Orchestrator<S> {
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: GraphCache::new(config.graph_policy),
            store,
            config,
            resolver: Box::new(NoInference),
        })
    }

    pub fn with_resolver(mut self, resolver: impl SpecialtyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    /// The cached proximity graph, built on first use.
    pub fn graph(&self) -> Result<Arc<Graph>> {
        self.cache.get_or_build(&self.store)
    }

    /// Specialty required by `patient`, falling back to the configured default.
    pub fn required_specialty(&self, patient: &PatientRecord) -> String {
        self.resolver
            .resolve(patient)
            .unwrap_or_else(|| self.config.fallback_specialty.clone())
    }

    /// Run every algorithm family for one patient.
    #[instrument(skip(self), fields(policy = %self.config.graph_policy))]
    pub fn compare_for_patient(&self, patient_id: &str) -> Result<ComparisonReport> {
        let patient = self
            .store
            .patient(patient_id)
            .ok_or_else(|| EngineError::patient_not_found(patient_id))?;
        let specialty = self.required_specialty(&patient);
        let hospitals = self.store.hospitals();
        let (tier, candidates) = select_candidates(&patient, &specialty, &hospitals);
        debug!(%specialty, ?tier, candidates = candidates.len(), "candidates selected");

        let graph = self.graph()?;

        let (assignment_algorithms, network_algorithms) = if self.config.parallel {
            rayon::join(
                || assignment_entries(&patient, &candidates, &graph),
                || network_entries(&graph),
            )
        } else {
            (
                assignment_entries(&patient, &candidates, &graph),
                network_entries(&graph),
            )
        };

        Ok(ComparisonReport {
            patient: PatientSummary::from(&patient),
            specialty_required: specialty,
            candidate_tier: tier,
            candidate_count: candidates.len(),
            graph_policy: self.cache.policy(),
            assignment_algorithms,
            network_algorithms: network_algorithms?,
        })
    }

    /// Pick one final hospital for a patient.
    ///
    /// Algorithms are tried in [`AssignmentAlgorithmKind::PREFERENCE`] order
    /// over the patient's candidate tier; the first placement wins. A patient
    /// no algorithm can place gets a report with every choice field `None`.
    #[instrument(skip(self))]
    pub fn best_assignment_for_patient(&self, patient_id: &str) -> Result<BestAssignment> {
        let patient = self
            .store
            .patient(patient_id)
            .ok_or_else(|| EngineError::patient_not_found(patient_id))?;
        let specialty = self.required_specialty(&patient);
        let hospitals = self.store.hospitals();
        let (tier, candidates) = select_candidates(&patient, &specialty, &hospitals);

        let algorithms: Vec<Box<dyn AssignmentAlgorithm>> = AssignmentAlgorithmKind::PREFERENCE
            .iter()
            .map(|kind| kind.create())
            .collect();
        let choice = first_placement(&algorithms, &patient, &candidates).and_then(
            |(algorithm, assignment)| {
                candidates
                    .iter()
                    .find(|h| h.id == assignment.hospital_id)
                    .map(|hospital| (algorithm, hospital))
            },
        );

        let mut report = BestAssignment {
            patient: PatientSummary::from(&patient),
            specialty_required: specialty,
            candidate_tier: tier,
            candidate_count: candidates.len(),
            algorithm: None,
            hospital: None,
            geo_distance_km: None,
            paths: None,
        };
        if let Some((algorithm, hospital)) = choice {
            debug!(algorithm = algorithm.name(), hospital = %hospital.id, "final placement");
            let graph = self.graph()?;
            report.algorithm = Some(AlgorithmInfo::new(
                algorithm.name(),
                AlgorithmCategory::Assignment,
                algorithm.complexity(),
            ));
            report.geo_distance_km = Some(patient.distance_km(hospital));
            report.paths = path_pair(&graph, &patient.id, &hospital.id);
            report.hospital = Some(hospital.into());
        }
        Ok(report)
    }

    /// Run one assignment algorithm over every patient and hospital in the
    /// store and return its full assignment list.
    pub fn assign_all(&self, kind: AssignmentAlgorithmKind) -> BatchAssignment {
        let patients = self.store.patients();
        let hospitals = self.store.hospitals();
        let algorithm = kind.create();
        let (assignments, elapsed_ms) = timed(|| algorithm.assign(&patients, &hospitals));

        let unassigned = patients
            .iter()
            .filter(|p| !assignments.iter().any(|a| a.patient_id == p.id))
            .map(|p| p.id.clone())
            .collect();
        BatchAssignment {
            info: AlgorithmInfo::new(
                algorithm.name(),
                AlgorithmCategory::Assignment,
                algorithm.complexity(),
            ),
            elapsed_ms,
            total_distance_km: total_distance_km(&assignments),
            assignments,
            unassigned,
        }
    }

    /// Shortest paths between two graph nodes, global assignment over every
    /// record, and the network algorithms rooted at `start`.
    #[instrument(skip(self))]
    pub fn compare_between(&self, start: &str, end: &str) -> Result<PairComparison> {
        let graph = self.graph()?;

        let paths = || {
            let (dijkstra_result, dijkstra_ms) = timed(|| dijkstra(&graph, start, end));
            let (bf_result, bf_ms) = timed(|| bellman_ford(&graph, start, end));
            let (fw_result, fw_ms) =
                timed(|| floyd_warshall(&graph).reconstruct_path(start, end));
            vec![
                PathEntry {
                    info: AlgorithmInfo::dijkstra(),
                    elapsed_ms: dijkstra_ms,
                    result: dijkstra_result,
                },
                PathEntry {
                    info: AlgorithmInfo::bellman_ford(),
                    elapsed_ms: bf_ms,
                    result: bf_result,
                },
                PathEntry {
                    info: AlgorithmInfo::floyd_warshall(),
                    elapsed_ms: fw_ms,
                    result: fw_result,
                },
            ]
        };

        let rest = || {
            let patients = self.store.patients();
            let hospitals = self.store.hospitals();
            let assignment = batch_assignment_entries(&patients, &hospitals);
            let network = rooted_network_entries(&graph, start, end);
            (assignment, network)
        };

        let (paths, (assignment, network)) = if self.config.parallel {
            rayon::join(paths, rest)
        } else {
            (paths(), rest())
        };

        Ok(PairComparison {
            start: start.to_string(),
            end: end.to_string(),
            paths,
            assignment,
            network: network?,
        })
    }

    /// Build each policy over the same snapshot and report its size.
    ///
    /// The `k` of a KNN-style configured policy is reused for both KNN
    /// variants; the radius comes from `default_radius_km`.
    pub fn compare_graph_policies(&self) -> Result<GraphPolicyComparison> {
        let nodes = self.store.node_snapshot();
        let k = match self.config.graph_policy {
            GraphPolicy::Knn { k } | GraphPolicy::BipartiteKnn { k } => k,
            GraphPolicy::Radius { .. } => GraphPolicy::DEFAULT_K,
        };
        let policies = [
            GraphPolicy::Knn { k },
            GraphPolicy::Radius {
                radius_km: self.config.default_radius_km,
            },
            GraphPolicy::BipartiteKnn { k },
        ];

        let policies = policies
            .into_iter()
            .map(|policy| {
                let (graph, build_ms) = timed(|| graph::build(&nodes, policy));
                Ok(PolicyStats {
                    policy,
                    build_ms,
                    stats: graph?.stats(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GraphPolicyComparison {
            node_count: nodes.len(),
            policies,
        })
    }

    /// Snapshot nodes plus the undirected edge listing of the cached graph.
    pub fn graph_view(&self) -> Result<GraphView> {
        let graph = self.graph()?;
        Ok(GraphView {
            policy: self.cache.policy(),
            stats: graph.stats(),
            nodes: self.store.node_snapshot(),
            edges: graph.unique_edges(),
        })
    }

    pub fn mst_kruskal(&self) -> Result<MstReport> {
        let graph = self.graph()?;
        let (mst, elapsed_ms) = timed(|| kruskal(&graph));
        Ok(MstReport {
            info: AlgorithmInfo::kruskal(),
            elapsed_ms,
            mst,
        })
    }

    /// Prim from `start`; an unknown start yields an empty tree.
    pub fn mst_prim(&self, start: &str) -> Result<MstReport> {
        let graph = self.graph()?;
        let (mst, elapsed_ms) = timed(|| prim(&graph, start));
        Ok(MstReport {
            info: AlgorithmInfo::prim(),
            elapsed_ms,
            mst,
        })
    }

    /// Unit-capacity maximum flow between two graph nodes.
    pub fn max_flow(&self, source: &str, sink: &str) -> Result<NetworkEntry> {
        let graph = self.graph()?;
        max_flow_entry(&graph, source, sink)
    }
}

fn assignment_entries(
    patient: &PatientRecord,
    candidates: &[HospitalRecord],
    graph: &Graph,
) -> Vec<AssignmentEntry> {
    AssignmentAlgorithmKind::ALL
        .iter()
        .map(|kind| {
            let algorithm = kind.create();
            let (assignment, elapsed_ms) = timed(|| algorithm.assign_one(patient, candidates));
            let info = AlgorithmInfo::new(
                algorithm.name(),
                AlgorithmCategory::Assignment,
                algorithm.complexity(),
            );

            let hospital = assignment
                .as_ref()
                .and_then(|a| candidates.iter().find(|h| h.id == a.hospital_id));
            match hospital {
                Some(hospital) => AssignmentEntry {
                    info,
                    elapsed_ms,
                    hospital: Some(hospital.into()),
                    geo_distance_km: Some(patient.distance_km(hospital)),
                    paths: path_pair(graph, &patient.id, &hospital.id),
                },
                None => AssignmentEntry {
                    info,
                    elapsed_ms,
                    hospital: None,
                    geo_distance_km: None,
                    paths: None,
                },
            }
        })
        .collect()
}

/// First algorithm, in slice order, that places `patient`.
fn first_placement<'a>(
    algorithms: &'a [Box<dyn AssignmentAlgorithm>],
    patient: &PatientRecord,
    candidates: &[HospitalRecord],
) -> Option<(&'a dyn AssignmentAlgorithm, Assignment)> {
    algorithms.iter().find_map(|algorithm| {
        algorithm
            .assign_one(patient, candidates)
            .map(|assignment| (algorithm.as_ref(), assignment))
    })
}

/// Dijkstra and Bellman-Ford on the graph; `None` when either node is absent.
fn path_pair(graph: &Graph, from: &str, to: &str) -> Option<PathPair> {
    if !graph.contains(from) || !graph.contains(to) {
        return None;
    }
    let (dijkstra_result, dijkstra_ms) = timed(|| dijkstra(graph, from, to));
    let (bf_result, bf_ms) = timed(|| bellman_ford(graph, from, to));
    Some(PathPair {
        dijkstra: PathEntry {
            info: AlgorithmInfo::dijkstra(),
            elapsed_ms: dijkstra_ms,
            result: dijkstra_result,
        },
        bellman_ford: PathEntry {
            info: AlgorithmInfo::bellman_ford(),
            elapsed_ms: bf_ms,
            result: bf_result,
        },
    })
}

fn batch_assignment_entries(
    patients: &[PatientRecord],
    hospitals: &[HospitalRecord],
) -> Vec<BatchAssignmentEntry> {
    AssignmentAlgorithmKind::ALL
        .iter()
        .map(|kind| {
            let algorithm = kind.create();
            let (assignments, elapsed_ms) = timed(|| algorithm.assign(patients, hospitals));
            BatchAssignmentEntry {
                info: AlgorithmInfo::new(
                    algorithm.name(),
                    AlgorithmCategory::Assignment,
                    algorithm.complexity(),
                ),
                elapsed_ms,
                assigned: assignments.len(),
                unassigned: patients.len() - assignments.len(),
                total_distance_km: total_distance_km(&assignments),
            }
        })
        .collect()
}

/// Kruskal, Prim from the first node and Edmonds-Karp from the first to the
/// second node.
fn network_entries(graph: &Graph) -> Result<Vec<NetworkEntry>> {
    let ids = graph.node_ids();
    match ids {
        [] => rooted_network_entries(graph, "", ""),
        [only] => rooted_network_entries(graph, only, only),
        [first, second, ..] => rooted_network_entries(graph, first, second),
    }
}

/// Kruskal over the whole graph, then Prim from `root` and Edmonds-Karp
/// `root -> sink` when those are distinct graph nodes.
fn rooted_network_entries(graph: &Graph, root: &str, sink: &str) -> Result<Vec<NetworkEntry>> {
    let mut entries = Vec::with_capacity(3);

    let (mst, elapsed_ms) = timed(|| kruskal(graph));
    entries.push(NetworkEntry::spanning_tree(AlgorithmInfo::kruskal(), elapsed_ms, &mst));

    if graph.contains(root) {
        let (mst, elapsed_ms) = timed(|| prim(graph, root));
        entries.push(NetworkEntry::spanning_tree(AlgorithmInfo::prim(), elapsed_ms, &mst));
    }

    if graph.contains(root) && graph.contains(sink) && root != sink {
        entries.push(max_flow_entry(graph, root, sink)?);
    }

    Ok(entries)
}

fn max_flow_entry(graph: &Graph, source: &str, sink: &str) -> Result<NetworkEntry> {
    let network = CapacityNetwork::unit_from_graph(graph);
    let (flow, elapsed_ms): (Result<u64>, Elapsed) = timed(|| edmonds_karp(&network, source, sink));
    Ok(NetworkEntry::max_flow(elapsed_ms, source, sink, flow?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InMemoryStore;
    use crate::report::NetworkOutcome;

    fn hospital(id: &str, department: &str, specialties: &[&str]) -> HospitalRecord {
        HospitalRecord::new(id, -12.05, -77.04, 1)
            .with_department(department)
            .with_specialties(specialties.iter().copied())
    }

    #[test]
    fn candidate_tiers_fall_through_in_order() {
        let hospitals = vec![
            hospital("H1", "Lima", &["Cardiología"]),
            hospital("H2", "Lima", &["Pediatría"]),
            hospital("H3", "Cusco", &["Traumatología"]),
        ];
        let patient = PatientRecord::new("P1", -12.0, -77.0).with_department("Lima");

        let (tier, found) = select_candidates(&patient, "cardiología", &hospitals);
        assert_eq!(tier, CandidateTier::DepartmentAndSpecialty);
        assert_eq!(found.len(), 1);

        let (tier, found) = select_candidates(&patient, "Traumatología", &hospitals);
        assert_eq!(tier, CandidateTier::Department);
        assert_eq!(found.len(), 2);

        let stranger = PatientRecord::new("P2", 0.0, 0.0).with_department("Loreto");
        let (tier, found) = select_candidates(&stranger, "Cardiología", &hospitals);
        assert_eq!(tier, CandidateTier::Nationwide);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn patient_without_department_searches_everywhere() {
        let hospitals = vec![
            hospital("H1", "Lima", &["Cardiología"]),
            hospital("H3", "Cusco", &["Traumatología"]),
        ];
        let patient = PatientRecord::new("P1", 0.0, 0.0);

        let (tier, found) = select_candidates(&patient, "Traumatología", &hospitals);
        assert_eq!(tier, CandidateTier::DepartmentAndSpecialty);
        assert_eq!(found[0].id, "H3");

        let (tier, found) = select_candidates(&patient, "Nefrología", &hospitals);
        assert_eq!(tier, CandidateTier::Nationwide);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let orchestrator =
            Orchestrator::new(InMemoryStore::default(), EngineConfig::default()).unwrap();
        let err = orchestrator.compare_for_patient("P404").unwrap_err();
        assert!(err.is_not_found());
        assert!(!orchestrator.cache().is_built());
    }

    #[test]
    fn network_entries_on_small_graphs() {
        let empty = Graph::new();
        let entries = network_entries(&empty).unwrap();
        assert_eq!(entries.len(), 1);

        let single = Graph::with_nodes(["A"]);
        assert_eq!(network_entries(&single).unwrap().len(), 2);

        let pair = Graph::from_edges([("A", "B", 1.0), ("B", "A", 1.0)]);
        let entries = network_entries(&pair).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[2].outcome,
            NetworkOutcome::MaxFlow {
                source: "A".into(),
                sink: "B".into(),
                max_flow: 1
            }
        );
    }

    /// Never places anyone.
    struct Decline;

    impl AssignmentAlgorithm for Decline {
        fn name(&self) -> &'static str {
            "Decline"
        }

        fn complexity(&self) -> &'static str {
            "O(1)"
        }

        fn assign(&self, _: &[PatientRecord], _: &[HospitalRecord]) -> Vec<Assignment> {
            Vec::new()
        }
    }

    #[test]
    fn first_placement_falls_through_in_order() {
        let patient = PatientRecord::new("P1", -12.0, -77.0);
        let candidates = vec![hospital("H1", "Lima", &["Cardiología"])];

        let algorithms: Vec<Box<dyn AssignmentAlgorithm>> = vec![
            Box::new(Decline),
            AssignmentAlgorithmKind::Hungarian.create(),
            AssignmentAlgorithmKind::Greedy.create(),
        ];
        let (algorithm, assignment) = first_placement(&algorithms, &patient, &candidates).unwrap();
        assert_eq!(algorithm.name(), "Hungarian");
        assert_eq!(assignment.hospital_id, "H1");

        let nobody: Vec<Box<dyn AssignmentAlgorithm>> = vec![Box::new(Decline), Box::new(Decline)];
        assert!(first_placement(&nobody, &patient, &candidates).is_none());
    }

    #[test]
    fn best_assignment_without_capacity_is_empty() {
        let store = InMemoryStore::new(
            vec![PatientRecord::new("P1", -12.0, -77.0).with_department("Lima")],
            vec![HospitalRecord::new("H1", -12.05, -77.04, 0).with_department("Lima")],
        );
        let orchestrator = Orchestrator::new(store, EngineConfig::default()).unwrap();
        let best = orchestrator.best_assignment_for_patient("P1").unwrap();
        assert_eq!(best.candidate_count, 1);
        assert!(best.algorithm.is_none());
        assert!(best.hospital.is_none());
        assert!(best.paths.is_none());

        let err = orchestrator.best_assignment_for_patient("P404").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = EngineConfig::default().with_graph_policy(GraphPolicy::Knn { k: 0 });
        assert!(Orchestrator::new(InMemoryStore::default(), config).is_err());
    }
}
