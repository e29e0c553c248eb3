use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::Graph;

use super::{trace_parents, PathResult};

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

// Min-heap by cost
impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `end` with a binary-heap Dijkstra.
///
/// Weights must be non-negative (Haversine weights always are). The search
/// stops as soon as `end` is settled. Unknown endpoints and unreachable
/// targets yield [`PathResult::NoRoute`].
pub fn dijkstra(graph: &Graph, start: &str, end: &str) -> PathResult {
    let (Some(start), Some(end)) = (graph.index_of(start), graph.index_of(end)) else {
        return PathResult::NoRoute;
    };

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[start] = 0.0;
    heap.push(State { cost: 0.0, node: start });

    while let Some(State { cost, node }) = heap.pop() {
        if node == end {
            break;
        }
        if cost > dist[node] {
            continue;
        }
        for edge in graph.edges_from(node) {
            let next_cost = cost + edge.weight_km;
            if next_cost < dist[edge.to] {
                dist[edge.to] = next_cost;
                parent[edge.to] = Some(node);
                heap.push(State {
                    cost: next_cost,
                    node: edge.to,
                });
            }
        }
    }

    if dist[end].is_infinite() {
        return PathResult::NoRoute;
    }
    trace_parents(graph, &parent, start, end, dist[end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        Graph::from_edges([
            ("A", "B", 1.0),
            ("A", "C", 4.0),
            ("B", "C", 1.5),
            ("C", "D", 1.0),
            ("B", "D", 5.0),
        ])
    }

    #[test]
    fn finds_cheapest_route_in_order() {
        let result = dijkstra(&diamond(), "A", "D");
        assert_eq!(result.distance_km(), Some(3.5));
        assert_eq!(result.path(), ["A", "B", "C", "D"]);
    }

    #[test]
    fn respects_edge_direction() {
        assert_eq!(dijkstra(&diamond(), "D", "A"), PathResult::NoRoute);
    }

    #[test]
    fn start_equals_end() {
        let result = dijkstra(&diamond(), "B", "B");
        assert_eq!(result.distance_km(), Some(0.0));
        assert_eq!(result.path(), ["B"]);
    }

    #[test]
    fn unknown_endpoints_have_no_route() {
        assert_eq!(dijkstra(&diamond(), "A", "Z"), PathResult::NoRoute);
        assert_eq!(dijkstra(&diamond(), "Z", "A"), PathResult::NoRoute);
    }

    #[test]
    fn does_not_mutate_graph() {
        let graph = diamond();
        let before: Vec<_> = graph.edge_triples().collect();
        let _ = dijkstra(&graph, "A", "D");
        let after: Vec<_> = graph.edge_triples().collect();
        assert_eq!(before, after);
    }
}
