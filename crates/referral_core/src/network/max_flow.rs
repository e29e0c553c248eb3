use std::collections::{HashMap, VecDeque};

use crate::error::{EngineError, Result};
use crate::graph::Graph;

/// Directed integer capacities keyed by `(from, to)`.
///
/// The residual-graph algorithm needs every `(u, v)` entry to have a `(v, u)`
/// companion; [`CapacityNetwork::add_reverse_entries`] fills missing ones with
/// capacity 0.
#[derive(Debug, Clone, Default)]
pub struct CapacityNetwork {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    capacity: HashMap<(usize, usize), u64>,
}

impl CapacityNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit capacity on every directed edge of `graph`, plus zero-capacity
    /// mirrors where the reverse edge is absent.
    pub fn unit_from_graph(graph: &Graph) -> Self {
        let mut network = Self::new();
        for id in graph.node_ids() {
            network.add_node(id);
        }
        for (u, v, _) in graph.edge_triples() {
            network.set_capacity_idx(u, v, 1);
        }
        network.add_reverse_entries();
        network
    }

    pub fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.index.insert(id.to_string(), idx);
        self.ids.push(id.to_string());
        self.adjacency.push(Vec::new());
        idx
    }

    /// Set (or overwrite) the capacity of `from -> to`. No mirror is added.
    pub fn set_capacity(&mut self, from: &str, to: &str, capacity: u64) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.set_capacity_idx(from, to, capacity);
    }

    fn set_capacity_idx(&mut self, from: usize, to: usize, capacity: u64) {
        if self.capacity.insert((from, to), capacity).is_none() {
            self.adjacency[from].push(to);
        }
    }

    /// Insert `(v, u) -> 0` for every `(u, v)` lacking a reverse entry.
    pub fn add_reverse_entries(&mut self) {
        let missing: Vec<(usize, usize)> = self
            .edge_keys()
            .filter(|&(u, v)| !self.capacity.contains_key(&(v, u)))
            .collect();
        for (u, v) in missing {
            self.set_capacity_idx(v, u, 0);
        }
    }

    fn edge_keys(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, targets)| targets.iter().map(move |&v| (u, v)))
    }

    pub fn capacity(&self, from: &str, to: &str) -> Option<u64> {
        let from = *self.index.get(from)?;
        let to = *self.index.get(to)?;
        self.capacity.get(&(from, to)).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Total capacity leaving `id`.
    pub fn outgoing_capacity(&self, id: &str) -> u64 {
        let Some(&u) = self.index.get(id) else {
            return 0;
        };
        self.adjacency[u]
            .iter()
            .map(|&v| self.capacity[&(u, v)])
            .sum()
    }

    /// Total capacity entering `id`.
    pub fn incoming_capacity(&self, id: &str) -> u64 {
        let Some(&v) = self.index.get(id) else {
            return 0;
        };
        self.edge_keys()
            .filter(|&(_, to)| to == v)
            .map(|key| self.capacity[&key])
            .sum()
    }

    fn check_residual_pairs(&self) -> Result<()> {
        match self
            .edge_keys()
            .find(|&(u, v)| !self.capacity.contains_key(&(v, u)))
        {
            Some((u, v)) => Err(EngineError::MalformedNetwork {
                from: self.ids[u].clone(),
                to: self.ids[v].clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Maximum flow from `source` to `sink` with BFS augmenting paths.
///
/// Fails with [`EngineError::MalformedNetwork`] when an entry lacks its
/// reverse residual. Unknown endpoints or `source == sink` give 0.
pub fn edmonds_karp(network: &CapacityNetwork, source: &str, sink: &str) -> Result<u64> {
    network.check_residual_pairs()?;
    let (Some(&s), Some(&t)) = (network.index.get(source), network.index.get(sink)) else {
        return Ok(0);
    };
    if s == t {
        return Ok(0);
    }

    let n = network.ids.len();
    let mut residual: HashMap<(usize, usize), u64> = network.capacity.clone();
    let mut max_flow = 0u64;

    loop {
        // BFS over residual capacity, parents double as the visited set
        let mut parent: Vec<Option<usize>> = vec![None; n];
        parent[s] = Some(s);
        let mut queue = VecDeque::from([s]);
        'bfs: while let Some(u) = queue.pop_front() {
            for &v in &network.adjacency[u] {
                if parent[v].is_none() && residual[&(u, v)] > 0 {
                    parent[v] = Some(u);
                    if v == t {
                        break 'bfs;
                    }
                    queue.push_back(v);
                }
            }
        }
        if parent[t].is_none() {
            break;
        }

        let mut bottleneck = u64::MAX;
        let mut v = t;
        while v != s {
            let u = parent[v].unwrap_or(s);
            bottleneck = bottleneck.min(residual[&(u, v)]);
            v = u;
        }

        let mut v = t;
        while v != s {
            let u = parent[v].unwrap_or(s);
            if let Some(forward) = residual.get_mut(&(u, v)) {
                *forward -= bottleneck;
            }
            if let Some(backward) = residual.get_mut(&(v, u)) {
                *backward = backward.saturating_add(bottleneck);
            }
            v = u;
        }
        max_flow = max_flow.saturating_add(bottleneck);
    }

    Ok(max_flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> CapacityNetwork {
        let mut net = CapacityNetwork::new();
        for (u, v, c) in [
            ("s", "a", 10),
            ("s", "c", 10),
            ("a", "b", 4),
            ("a", "c", 2),
            ("a", "d", 8),
            ("c", "d", 9),
            ("d", "b", 6),
            ("b", "t", 10),
            ("d", "t", 10),
        ] {
            net.set_capacity(u, v, c);
        }
        net.add_reverse_entries();
        net
    }

    #[test]
    fn textbook_network() {
        assert_eq!(edmonds_karp(&classic(), "s", "t").expect("well formed"), 19);
    }

    #[test]
    fn missing_reverse_entry_is_malformed() {
        let mut net = CapacityNetwork::new();
        net.set_capacity("s", "t", 3);
        let err = edmonds_karp(&net, "s", "t").expect_err("no mirror");
        assert!(matches!(err, EngineError::MalformedNetwork { .. }));
    }

    #[test]
    fn unit_network_from_graph_has_mirrors() {
        let graph = Graph::from_edges([("A", "B", 3.0), ("B", "C", 1.0), ("C", "B", 1.0)]);
        let net = CapacityNetwork::unit_from_graph(&graph);
        assert_eq!(net.capacity("A", "B"), Some(1));
        assert_eq!(net.capacity("B", "A"), Some(0));
        assert_eq!(net.capacity("B", "C"), Some(1));
        assert_eq!(net.capacity("C", "B"), Some(1));
        assert_eq!(net.capacity("A", "C"), None);
        assert_eq!(edmonds_karp(&net, "A", "C").expect("well formed"), 1);
    }

    #[test]
    fn flow_saturates_at_u64_max() {
        let mut net = CapacityNetwork::new();
        for (u, v) in [("s", "t"), ("s", "a"), ("a", "t")] {
            net.set_capacity(u, v, u64::MAX);
        }
        net.add_reverse_entries();
        assert_eq!(edmonds_karp(&net, "s", "t").expect("well formed"), u64::MAX);
    }

    #[test]
    fn degenerate_endpoints_carry_no_flow() {
        let net = classic();
        assert_eq!(edmonds_karp(&net, "s", "s").expect("well formed"), 0);
        assert_eq!(edmonds_karp(&net, "s", "zz").expect("well formed"), 0);
        assert_eq!(edmonds_karp(&net, "t", "s").expect("well formed"), 0);
    }

    #[test]
    fn flow_bounded_by_cut_capacities() {
        let net = classic();
        let flow = edmonds_karp(&net, "s", "t").expect("well formed");
        assert!(flow <= net.outgoing_capacity("s"));
        assert!(flow <= net.incoming_capacity("t"));
    }
}
