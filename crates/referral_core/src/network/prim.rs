use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::graph::Graph;

use super::MstResult;

/// Frontier edge; ordered by weight, then by push order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    weight_km: f64,
    seq: usize,
    from: usize,
    to: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight_km
            .total_cmp(&other.weight_km)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grow a minimum spanning tree from `start` with a binary heap.
///
/// Only outgoing edges are followed, so on an asymmetric graph the tree
/// depends on `start` and may leave nodes uncovered. An unknown `start`
/// yields an empty result.
pub fn prim(graph: &Graph, start: &str) -> MstResult {
    let mut mst = MstResult::default();
    let Some(start) = graph.index_of(start) else {
        return mst;
    };

    let mut visited = vec![false; graph.node_count()];
    let mut heap = BinaryHeap::new();
    let mut seq = 0usize;

    visited[start] = true;
    push_frontier(graph, &mut heap, &mut seq, start, &visited);

    while let Some(Reverse(Frontier { weight_km, from, to, .. })) = heap.pop() {
        if visited[to] {
            continue;
        }
        visited[to] = true;
        mst.push(graph.id(from), graph.id(to), weight_km);
        push_frontier(graph, &mut heap, &mut seq, to, &visited);
    }
    mst
}

fn push_frontier(
    graph: &Graph,
    heap: &mut BinaryHeap<Reverse<Frontier>>,
    seq: &mut usize,
    from: usize,
    visited: &[bool],
) {
    for edge in graph.edges_from(from) {
        if !visited[edge.to] {
            heap.push(Reverse(Frontier {
                weight_km: edge.weight_km,
                seq: *seq,
                from,
                to: edge.to,
            }));
            *seq += 1;
        }
    }
}
