use crate::graph::Graph;

use super::{MstResult, UnionFind};

/// Minimum spanning forest by Kruskal's algorithm.
///
/// Every directed edge is treated as undirected; both directions of a pair
/// simply compete as parallel edges. Equal weights keep edge order. A
/// disconnected graph yields a forest with fewer than `|V| - 1` edges.
pub fn kruskal(graph: &Graph) -> MstResult {
    let mut edges: Vec<(usize, usize, f64)> = graph.edge_triples().collect();
    edges.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut sets = UnionFind::new(graph.node_count());
    let mut mst = MstResult::default();
    for (u, v, w) in edges {
        if sets.union(u, v) {
            mst.push(graph.id(u), graph.id(v), w);
        }
    }
    mst
}
