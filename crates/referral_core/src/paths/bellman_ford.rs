use crate::graph::Graph;

use super::{trace_parents, PathResult};

/// Shortest path from `start` to `end` by repeated edge relaxation.
///
/// Runs at most `|V| - 1` rounds and stops early once a round changes
/// nothing. Negative weights are handled; negative cycles are not detected.
pub fn bellman_ford(graph: &Graph, start: &str, end: &str) -> PathResult {
    let (Some(start), Some(end)) = (graph.index_of(start), graph.index_of(end)) else {
        return PathResult::NoRoute;
    };

    let n = graph.node_count();
    let edges: Vec<(usize, usize, f64)> = graph.edge_triples().collect();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    for _ in 1..n {
        let mut changed = false;
        for &(u, v, w) in &edges {
            if dist[u].is_infinite() {
                continue;
            }
            let candidate = dist[u] + w;
            if candidate < dist[v] {
                dist[v] = candidate;
                parent[v] = Some(u);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if dist[end].is_infinite() {
        return PathResult::NoRoute;
    }
    trace_parents(graph, &parent, start, end, dist[end])
}
