use std::collections::HashMap;

use crate::graph::Graph;

use super::PathResult;

/// All-pairs distances and next-hop table from [`floyd_warshall`].
#[derive(Debug, Clone)]
pub struct AllPairs {
    order: Vec<String>,
    index: HashMap<String, usize>,
    dist: Vec<Vec<f64>>,
    next_hop: Vec<Vec<Option<usize>>>,
}

impl AllPairs {
    /// Node ids in matrix order.
    pub fn node_order(&self) -> &[String] {
        &self.order
    }

    /// Shortest distance between two ids, `None` when unreachable or unknown.
    pub fn distance_km(&self, start: &str, end: &str) -> Option<f64> {
        let i = *self.index.get(start)?;
        let j = *self.index.get(end)?;
        let d = self.dist[i][j];
        d.is_finite().then_some(d)
    }

    /// Row-major distance matrix; unreachable entries are `None`.
    pub fn distance_matrix(&self) -> Vec<Vec<Option<f64>>> {
        self.dist
            .iter()
            .map(|row| row.iter().map(|d| d.is_finite().then_some(*d)).collect())
            .collect()
    }

    /// Follow next-hop pointers from `start` until `end`.
    pub fn reconstruct_path(&self, start: &str, end: &str) -> PathResult {
        let (Some(&i), Some(&j)) = (self.index.get(start), self.index.get(end)) else {
            return PathResult::NoRoute;
        };
        let Some(mut current) = self.next_hop[i][j] else {
            return PathResult::NoRoute;
        };

        let mut path = vec![self.order[i].clone()];
        if i != j {
            loop {
                path.push(self.order[current].clone());
                if current == j {
                    break;
                }
                // A longer walk means the table is cyclic (negative cycle).
                if path.len() > self.order.len() {
                    return PathResult::NoRoute;
                }
                match self.next_hop[current][j] {
                    Some(next) => current = next,
                    None => return PathResult::NoRoute,
                }
            }
        }
        PathResult::Found {
            distance_km: self.dist[i][j],
            path,
        }
    }
}

/// Classic O(n³) all-pairs dynamic programme.
///
/// Parallel edges keep the lightest weight. The diagonal is zero with a
/// self next-hop, so `reconstruct_path(x, x)` returns `[x]`.
pub fn floyd_warshall(graph: &Graph) -> AllPairs {
    let n = graph.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    let mut next_hop: Vec<Vec<Option<usize>>> = vec![vec![None; n]; n];

    for i in 0..n {
        dist[i][i] = 0.0;
        next_hop[i][i] = Some(i);
    }
    for (u, v, w) in graph.edge_triples() {
        if w < dist[u][v] {
            dist[u][v] = w;
            next_hop[u][v] = Some(v);
        }
    }

    for k in 0..n {
        for i in 0..n {
            let d_ik = dist[i][k];
            if d_ik.is_infinite() {
                continue;
            }
            for j in 0..n {
                let candidate = d_ik + dist[k][j];
                if candidate < dist[i][j] {
                    dist[i][j] = candidate;
                    next_hop[i][j] = next_hop[i][k];
                }
            }
        }
    }

    let order = graph.node_ids().to_vec();
    let index = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), idx))
        .collect();
    AllPairs {
        order,
        index,
        dist,
        next_hop,
    }
}
