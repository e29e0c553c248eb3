//! Serializable comparison reports produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::graph::{GraphPolicy, GraphStats, UndirectedEdge};
use crate::matching::Assignment;
use crate::network::MstResult;
use crate::paths::PathResult;
use crate::records::{HospitalRecord, PatientRecord};
use crate::timing::Elapsed;

/// Algorithm family, used to group report entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmCategory {
    Assignment,
    ShortestPath,
    SpanningTree,
    MaxFlow,
}

/// Name, family and descriptive complexity of one algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub algorithm: String,
    pub category: AlgorithmCategory,
    pub complexity: String,
}

impl AlgorithmInfo {
    pub fn new(algorithm: &str, category: AlgorithmCategory, complexity: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            category,
            complexity: complexity.to_string(),
        }
    }

    pub fn dijkstra() -> Self {
        Self::new("Dijkstra", AlgorithmCategory::ShortestPath, "O(E log V)")
    }

    pub fn bellman_ford() -> Self {
        Self::new("Bellman-Ford", AlgorithmCategory::ShortestPath, "O(V·E)")
    }

    pub fn floyd_warshall() -> Self {
        Self::new("Floyd-Warshall", AlgorithmCategory::ShortestPath, "O(n^3)")
    }

    pub fn kruskal() -> Self {
        Self::new("Kruskal", AlgorithmCategory::SpanningTree, "O(E log V)")
    }

    pub fn prim() -> Self {
        Self::new("Prim", AlgorithmCategory::SpanningTree, "O(E log V)")
    }

    pub fn edmonds_karp() -> Self {
        Self::new("Edmonds-Karp", AlgorithmCategory::MaxFlow, "O(V·E^2)")
    }
}

/// Which candidate filter produced the hospitals a patient was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateTier {
    /// Same department and offering the required specialty.
    DepartmentAndSpecialty,
    /// Same department, any specialty.
    Department,
    /// Every hospital in the feed.
    Nationwide,
}

impl CandidateTier {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateTier::DepartmentAndSpecialty => "department_and_specialty",
            CandidateTier::Department => "department",
            CandidateTier::Nationwide => "nationwide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub severity: Option<String>,
    pub department: Option<String>,
    pub disease: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl From<&PatientRecord> for PatientSummary {
    fn from(p: &PatientRecord) -> Self {
        Self {
            id: p.id.clone(),
            severity: p.severity.clone(),
            department: p.department.clone(),
            disease: p.disease.clone(),
            lat: p.lat,
            lon: p.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalSummary {
    pub id: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub specialties: Vec<String>,
}

impl From<&HospitalRecord> for HospitalSummary {
    fn from(h: &HospitalRecord) -> Self {
        Self {
            id: h.id.clone(),
            name: h.name.clone(),
            department: h.department.clone(),
            lat: h.lat,
            lon: h.lon,
            specialties: h.specialties.clone(),
        }
    }
}

/// One timed shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    pub result: PathResult,
}

/// Dijkstra and Bellman-Ford between an assigned patient and hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPair {
    pub dijkstra: PathEntry,
    pub bellman_ford: PathEntry,
}

/// Result of one assignment algorithm for a single patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    /// `None` when no candidate hospital had capacity.
    pub hospital: Option<HospitalSummary>,
    pub geo_distance_km: Option<f64>,
    /// `None` when unassigned or when either endpoint is not a graph node.
    pub paths: Option<PathPair>,
}

/// Global assignment over every record, as used by pairwise comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAssignmentEntry {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    pub assigned: usize,
    pub unassigned: usize,
    pub total_distance_km: f64,
}

/// Full output of one assignment algorithm over every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAssignment {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    pub assignments: Vec<Assignment>,
    /// Patients left without a hospital, in feed order.
    pub unassigned: Vec<String>,
    pub total_distance_km: f64,
}

/// Final hospital for one patient, taken from the first algorithm in
/// preference order that places the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestAssignment {
    pub patient: PatientSummary,
    pub specialty_required: String,
    pub candidate_tier: CandidateTier,
    pub candidate_count: usize,
    /// Algorithm that produced the placement; `None` when nothing could.
    pub algorithm: Option<AlgorithmInfo>,
    pub hospital: Option<HospitalSummary>,
    pub geo_distance_km: Option<f64>,
    pub paths: Option<PathPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkOutcome {
    SpanningTree { total_cost: f64, edge_count: usize },
    MaxFlow { source: String, sink: String, max_flow: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntry {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    pub outcome: NetworkOutcome,
}

impl NetworkEntry {
    pub(crate) fn spanning_tree(info: AlgorithmInfo, elapsed_ms: Elapsed, mst: &MstResult) -> Self {
        Self {
            info,
            elapsed_ms,
            outcome: NetworkOutcome::SpanningTree {
                total_cost: mst.total_cost,
                edge_count: mst.edges.len(),
            },
        }
    }

    pub(crate) fn max_flow(
        elapsed_ms: Elapsed,
        source: &str,
        sink: &str,
        max_flow: u64,
    ) -> Self {
        Self {
            info: AlgorithmInfo::edmonds_karp(),
            elapsed_ms,
            outcome: NetworkOutcome::MaxFlow {
                source: source.to_string(),
                sink: sink.to_string(),
                max_flow,
            },
        }
    }
}

/// Per-patient comparison of every algorithm family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub patient: PatientSummary,
    pub specialty_required: String,
    pub candidate_tier: CandidateTier,
    pub candidate_count: usize,
    pub graph_policy: GraphPolicy,
    pub assignment_algorithms: Vec<AssignmentEntry>,
    pub network_algorithms: Vec<NetworkEntry>,
}

impl ComparisonReport {
    pub fn assignment(&self, algorithm: &str) -> Option<&AssignmentEntry> {
        self.assignment_algorithms
            .iter()
            .find(|entry| entry.info.algorithm == algorithm)
    }

    pub fn network(&self, algorithm: &str) -> Option<&NetworkEntry> {
        self.network_algorithms
            .iter()
            .find(|entry| entry.info.algorithm == algorithm)
    }
}

/// Every algorithm run between two graph nodes and over all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairComparison {
    pub start: String,
    pub end: String,
    pub paths: Vec<PathEntry>,
    pub assignment: Vec<BatchAssignmentEntry>,
    pub network: Vec<NetworkEntry>,
}

/// Build statistics of one policy over a shared snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStats {
    pub policy: GraphPolicy,
    pub build_ms: Elapsed,
    #[serde(flatten)]
    pub stats: GraphStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPolicyComparison {
    pub node_count: usize,
    pub policies: Vec<PolicyStats>,
}

/// The cached graph as nodes plus de-duplicated undirected edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub policy: GraphPolicy,
    pub stats: GraphStats,
    pub nodes: Vec<GeoPoint>,
    pub edges: Vec<UndirectedEdge>,
}

/// Standalone spanning-tree query with the full edge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MstReport {
    #[serde(flatten)]
    pub info: AlgorithmInfo,
    pub elapsed_ms: Elapsed,
    #[serde(flatten)]
    pub mst: MstResult,
}
