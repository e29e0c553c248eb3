//! Shortest-path algorithms over a [`Graph`](crate::graph::Graph).
//!
//! - [`dijkstra`]: single pair, non-negative weights, early exit on target.
//! - [`bellman_ford`]: single pair, tolerates negative weights.
//! - [`floyd_warshall`]: all pairs with next-hop path reconstruction.
//!
//! Every result path runs from `start` to `end` inclusive.

mod bellman_ford;
mod dijkstra;
mod floyd_warshall;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

pub use bellman_ford::bellman_ford;
pub use dijkstra::dijkstra;
pub use floyd_warshall::{floyd_warshall, AllPairs};

/// Outcome of a single-pair shortest path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathResult {
    Found { distance_km: f64, path: Vec<String> },
    NoRoute,
}

impl PathResult {
    pub fn distance_km(&self) -> Option<f64> {
        match self {
            PathResult::Found { distance_km, .. } => Some(*distance_km),
            PathResult::NoRoute => None,
        }
    }

    pub fn path(&self) -> &[String] {
        match self {
            PathResult::Found { path, .. } => path,
            PathResult::NoRoute => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found { .. })
    }
}

/// Rebuild `start -> end` from a predecessor array.
///
/// A chain that does not lead back to `start` within `|V|` steps yields
/// `NoRoute`.
pub(crate) fn trace_parents(
    graph: &Graph,
    parent: &[Option<usize>],
    start: usize,
    end: usize,
    distance_km: f64,
) -> PathResult {
    let mut route = vec![end];
    let mut current = end;
    while current != start {
        match parent[current] {
            Some(prev) if route.len() <= graph.node_count() => {
                route.push(prev);
                current = prev;
            }
            _ => return PathResult::NoRoute,
        }
    }
    route.reverse();
    PathResult::Found {
        distance_km,
        path: route.into_iter().map(|idx| graph.id(idx).to_string()).collect(),
    }
}
