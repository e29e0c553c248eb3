//! Proximity graph construction from a geocoded node snapshot.
//!
//! All policies compute the full quadratic distance set; batching or spatial
//! indexing is left to callers with very large snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::geo::{GeoPoint, NodeKind};

use super::Graph;

/// Construction policy together with its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum GraphPolicy {
    /// Each node links to its `k` nearest nodes of any kind.
    Knn { k: usize },
    /// Each ordered pair within `radius_km` is linked.
    Radius { radius_km: f64 },
    /// Each patient links to its `k` nearest hospitals.
    BipartiteKnn { k: usize },
}

impl GraphPolicy {
    pub const DEFAULT_K: usize = 10;

    /// Reject degenerate parameters before any distance is computed.
    pub fn validate(&self) -> Result<()> {
        match *self {
            GraphPolicy::Knn { k } | GraphPolicy::BipartiteKnn { k } if k == 0 => {
                Err(EngineError::InvalidParameter {
                    name: "k",
                    value: k.to_string(),
                })
            }
            GraphPolicy::Radius { radius_km } if !(radius_km.is_finite() && radius_km > 0.0) => {
                Err(EngineError::InvalidParameter {
                    name: "radius_km",
                    value: radius_km.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GraphPolicy::Knn { .. } => "knn",
            GraphPolicy::Radius { .. } => "radius",
            GraphPolicy::BipartiteKnn { .. } => "bipartite_knn",
        }
    }
}

impl Default for GraphPolicy {
    fn default() -> Self {
        GraphPolicy::Knn {
            k: Self::DEFAULT_K,
        }
    }
}

impl fmt::Display for GraphPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphPolicy::Knn { k } => write!(f, "knn(k={k})"),
            GraphPolicy::Radius { radius_km } => write!(f, "radius(r={radius_km}km)"),
            GraphPolicy::BipartiteKnn { k } => write!(f, "bipartite_knn(k={k})"),
        }
    }
}

/// Validate `policy` and build the corresponding graph.
pub fn build(nodes: &[GeoPoint], policy: GraphPolicy) -> Result<Graph> {
    policy.validate()?;
    let graph = match policy {
        GraphPolicy::Knn { k } => build_knn(nodes, k),
        GraphPolicy::Radius { radius_km } => build_radius(nodes, radius_km),
        GraphPolicy::BipartiteKnn { k } => build_bipartite_knn(nodes, k),
    };
    debug!(
        %policy,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "proximity graph built"
    );
    Ok(graph)
}

fn empty_graph(nodes: &[GeoPoint]) -> Graph {
    Graph::with_nodes(nodes.iter().map(|node| node.id.as_str()))
}

/// Stable ascending sort on distance: equal distances keep candidate order.
fn sort_by_distance(candidates: &mut [(usize, f64)]) {
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// Link every node to its `k` nearest other nodes.
///
/// With `k >= n - 1` every node links to all others.
pub fn build_knn(nodes: &[GeoPoint], k: usize) -> Graph {
    let mut graph = empty_graph(nodes);
    let mut candidates = Vec::with_capacity(nodes.len());

    for (i, origin) in nodes.iter().enumerate() {
        candidates.clear();
        candidates.extend(
            nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, other)| (j, origin.distance_km(other))),
        );
        sort_by_distance(&mut candidates);

        let from = graph.add_node(origin.id.as_str());
        for &(j, distance_km) in candidates.iter().take(k) {
            let to = graph.add_node(nodes[j].id.as_str());
            graph.push_edge(from, to, distance_km);
        }
    }
    graph
}

/// Link every ordered pair of distinct nodes within `radius_km` (inclusive).
pub fn build_radius(nodes: &[GeoPoint], radius_km: f64) -> Graph {
    let mut graph = empty_graph(nodes);
    for (i, origin) in nodes.iter().enumerate() {
        let from = graph.add_node(origin.id.as_str());
        for (j, other) in nodes.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance_km = origin.distance_km(other);
            if distance_km <= radius_km {
                let to = graph.add_node(other.id.as_str());
                graph.push_edge(from, to, distance_km);
            }
        }
    }
    graph
}

/// Link every patient to its `k` nearest hospitals; nothing else is linked.
pub fn build_bipartite_knn(nodes: &[GeoPoint], k: usize) -> Graph {
    let mut graph = empty_graph(nodes);

    let hospitals: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind == NodeKind::Hospital)
        .map(|(idx, _)| idx)
        .collect();
    if hospitals.is_empty() {
        warn!(nodes = nodes.len(), "no hospitals in snapshot; bipartite graph is empty");
        return graph;
    }

    let mut candidates = Vec::with_capacity(hospitals.len());
    for patient in nodes.iter().filter(|node| node.kind == NodeKind::Patient) {
        candidates.clear();
        candidates.extend(hospitals.iter().map(|&h| (h, patient.distance_km(&nodes[h]))));
        sort_by_distance(&mut candidates);

        let from = graph.add_node(patient.id.as_str());
        for &(h, distance_km) in candidates.iter().take(k) {
            let to = graph.add_node(nodes[h].id.as_str());
            graph.push_edge(from, to, distance_km);
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lima_nodes() -> Vec<GeoPoint> {
        vec![
            GeoPoint::patient("P1", -12.046, -77.043),
            GeoPoint::patient("P2", -12.120, -77.030),
            GeoPoint::hospital("H1", -12.056, -77.040),
            GeoPoint::hospital("H2", -12.100, -77.020),
            GeoPoint::patient("P3", -11.990, -77.060),
        ]
    }

    #[test]
    fn knn_respects_k_and_sorts_by_distance() {
        let nodes = lima_nodes();
        let graph = build_knn(&nodes, 2);
        assert_eq!(graph.node_count(), 5);
        for id in graph.node_ids() {
            let weights: Vec<f64> = graph.neighbors(id).map(|(_, w)| w).collect();
            assert_eq!(weights.len(), 2);
            assert!(weights[0] <= weights[1]);
        }
        let first = graph.neighbors("P1").next().map(|(id, _)| id);
        assert_eq!(first, Some("H1"));
    }

    #[test]
    fn knn_with_large_k_connects_everything() {
        let nodes = lima_nodes();
        let graph = build_knn(&nodes, 50);
        assert_eq!(graph.edge_count(), 5 * 4);
    }

    #[test]
    fn knn_ties_keep_snapshot_order() {
        // B and C are equidistant from A.
        let nodes = vec![
            GeoPoint::patient("A", 0.0, 0.0),
            GeoPoint::patient("C", 0.0, 1.0),
            GeoPoint::patient("B", 0.0, -1.0),
        ];
        let graph = build_knn(&nodes, 1);
        assert_eq!(graph.neighbors("A").next().map(|(id, _)| id), Some("C"));
    }

    #[test]
    fn radius_is_inclusive_and_symmetric() {
        let nodes = vec![
            GeoPoint::patient("A", 0.0, 0.0),
            GeoPoint::hospital("B", 0.0, 0.1),
            GeoPoint::hospital("C", 0.0, 5.0),
        ];
        let d_ab = nodes[0].distance_km(&nodes[1]);
        let graph = build_radius(&nodes, d_ab);
        assert_eq!(graph.weight("A", "B"), Some(d_ab));
        assert_eq!(graph.weight("B", "A"), Some(d_ab));
        assert_eq!(graph.neighbors("C").count(), 0);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn bipartite_only_links_patients_to_hospitals() {
        let nodes = lima_nodes();
        let graph = build_bipartite_knn(&nodes, 1);
        assert_eq!(graph.neighbors("H1").count(), 0);
        assert_eq!(graph.neighbors("H2").count(), 0);
        assert_eq!(graph.neighbors("P2").collect::<Vec<_>>().len(), 1);
        assert_eq!(graph.neighbors("P2").next().map(|(id, _)| id), Some("H2"));
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn bipartite_without_hospitals_keeps_all_nodes() {
        let nodes = vec![
            GeoPoint::patient("P1", 0.0, 0.0),
            GeoPoint::patient("P2", 1.0, 1.0),
        ];
        let graph = build_bipartite_knn(&nodes, 3);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn empty_snapshot_gives_empty_graph() {
        let graph = build(&[], GraphPolicy::Radius { radius_km: 10.0 }).expect("valid policy");
        assert!(graph.is_empty());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let nodes = lima_nodes();
        for policy in [
            GraphPolicy::Knn { k: 0 },
            GraphPolicy::BipartiteKnn { k: 0 },
            GraphPolicy::Radius { radius_km: 0.0 },
            GraphPolicy::Radius { radius_km: -3.0 },
            GraphPolicy::Radius { radius_km: f64::NAN },
        ] {
            let err = build(&nodes, policy).expect_err("degenerate parameter");
            assert!(matches!(err, EngineError::InvalidParameter { .. }), "{policy}: {err}");
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let nodes = lima_nodes();
        let a = build_knn(&nodes, 3);
        let b = build_knn(&nodes, 3);
        assert_eq!(a.unique_edges(), b.unique_edges());
        let triples_a: Vec<_> = a.edge_triples().collect();
        let triples_b: Vec<_> = b.edge_triples().collect();
        assert_eq!(triples_a, triples_b);
    }

    #[test]
    fn policy_serializes_with_tag() {
        let json = serde_json::to_string(&GraphPolicy::BipartiteKnn { k: 4 }).expect("serialize");
        assert_eq!(json, r#"{"policy":"bipartite_knn","k":4}"#);
    }
}
