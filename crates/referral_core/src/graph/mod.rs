//! Weighted directed proximity graph.
//!
//! Nodes live in an index arena in snapshot order; each node owns an ordered
//! list of outgoing [`Edge`]s. Algorithms address nodes by index and translate
//! back to ids only when producing results.

pub mod builder;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

pub use builder::{build, build_bipartite_knn, build_knn, build_radius, GraphPolicy};

/// Outgoing edge to the node at arena index `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub weight_km: f64,
}

/// One undirected edge in a de-duplicated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndirectedEdge {
    pub source: String,
    pub target: String,
    pub weight_km: f64,
}

/// Size summary of a built graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub avg_degree: f64,
}

/// Directed adjacency keyed by node id.
///
/// Every node of the snapshot is present even when it has no outgoing edges.
/// Self-loops are never stored.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with the given nodes (in order) and no edges. Repeated ids are
    /// collapsed onto their first occurrence.
    pub fn with_nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for id in ids {
            graph.add_node(id);
        }
        graph
    }

    /// Build a graph from an explicit edge list; endpoints are added as nodes
    /// in first-seen order.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str, f64)>) -> Self {
        let mut graph = Self::new();
        for (from, to, weight_km) in edges {
            graph.add_edge(from, to, weight_km);
        }
        graph
    }

    /// Insert a node if absent and return its arena index.
    pub fn add_node(&mut self, id: impl Into<String>) -> usize {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.ids.len();
        self.index.insert(id.clone(), idx);
        self.ids.push(id);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Append a directed edge, adding missing endpoints. Self-loops are
    /// dropped; returns whether the edge was stored.
    pub fn add_edge(&mut self, from: &str, to: &str, weight_km: f64) -> bool {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.push_edge(from, to, weight_km)
    }

    pub(crate) fn push_edge(&mut self, from: usize, to: usize, weight_km: f64) -> bool {
        if from == to {
            return false;
        }
        self.adjacency[from].push(Edge { to, weight_km });
        true
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Id of the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    /// Node ids in snapshot order.
    pub fn node_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn edges_from(&self, idx: usize) -> &[Edge] {
        &self.adjacency[idx]
    }

    /// Outgoing `(neighbor_id, weight_km)` pairs of `id`, in insertion order.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let edges: &'a [Edge] = self
            .index_of(id)
            .map(|idx| self.adjacency[idx].as_slice())
            .unwrap_or(&[]);
        edges
            .iter()
            .map(move |edge| (self.ids[edge.to].as_str(), edge.weight_km))
    }

    /// Weight of the first stored `from -> to` edge.
    pub fn weight(&self, from: &str, to: &str) -> Option<f64> {
        let to = self.index_of(to)?;
        let from = self.index_of(from)?;
        self.adjacency[from]
            .iter()
            .find(|edge| edge.to == to)
            .map(|edge| edge.weight_km)
    }

    /// All directed edges as `(from_idx, to_idx, weight_km)`, grouped by source
    /// in node order.
    pub fn edge_triples(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(from, edges)| edges.iter().map(move |edge| (from, edge.to, edge.weight_km)))
    }

    pub fn stats(&self) -> GraphStats {
        let num_nodes = self.node_count();
        let num_edges = self.edge_count();
        GraphStats {
            num_nodes,
            num_edges,
            avg_degree: num_edges as f64 / num_nodes.max(1) as f64,
        }
    }

    /// Copy of this graph where every edge `u -> v` also exists as `v -> u`.
    ///
    /// Reverse edges take the weight of the forward edge; existing reverse
    /// edges are left untouched. Nothing in the engine calls this implicitly.
    pub fn symmetrized(&self) -> Graph {
        let mut out = self.clone();
        let mut present: HashSet<(usize, usize)> = self
            .edge_triples()
            .map(|(from, to, _)| (from, to))
            .collect();
        for (from, to, weight_km) in self.edge_triples() {
            if present.insert((to, from)) {
                out.push_edge(to, from, weight_km);
            }
        }
        out
    }

    /// Undirected view: `u -> v` and `v -> u` collapse into one record, the
    /// first occurrence in edge order wins.
    pub fn unique_edges(&self) -> Vec<UndirectedEdge> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (from, to, weight_km) in self.edge_triples() {
            let key = if from < to { (from, to) } else { (to, from) };
            if seen.insert(key) {
                out.push(UndirectedEdge {
                    source: self.ids[from].clone(),
                    target: self.ids[to].clone(),
                    weight_km,
                });
            }
        }
        out
    }
}
