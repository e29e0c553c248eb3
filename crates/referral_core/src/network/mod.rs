//! Network-science comparisons over the proximity graph: minimum spanning
//! trees and maximum flow.
//!
//! Kruskal reads the directed graph as an undirected multigraph; Prim only
//! follows edges in their stored direction. On an asymmetric KNN graph the two
//! can disagree, and Prim may not reach every node. Callers that want
//! undirected semantics pass [`Graph::symmetrized`](crate::graph::Graph::symmetrized).

mod kruskal;
mod max_flow;
mod prim;
mod union_find;

use serde::{Deserialize, Serialize};

pub use kruskal::kruskal;
pub use max_flow::{edmonds_karp, CapacityNetwork};
pub use prim::prim;
pub use union_find::UnionFind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MstEdge {
    pub from: String,
    pub to: String,
    pub weight_km: f64,
}

/// Spanning tree (or forest, for disconnected input) and its total weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MstResult {
    pub edges: Vec<MstEdge>,
    pub total_cost: f64,
}

impl MstResult {
    pub(crate) fn push(&mut self, from: &str, to: &str, weight_km: f64) {
        self.edges.push(MstEdge {
            from: from.to_string(),
            to: to.to_string(),
            weight_km,
        });
        self.total_cost += weight_km;
    }

    /// Whether the result spans `node_count` nodes as a single tree.
    pub fn is_spanning_tree(&self, node_count: usize) -> bool {
        self.edges.len() + 1 == node_count.max(1)
    }
}
