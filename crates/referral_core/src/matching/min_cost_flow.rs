//! Min-cost max-flow assignment over a source → patients → hospitals → sink
//! network, solved by successive shortest paths.

use std::collections::VecDeque;

use tracing::trace;

use crate::records::{HospitalRecord, PatientRecord};

use super::algorithm::AssignmentAlgorithm;
use super::types::{scaled_cost, Assignment};

#[derive(Debug, Clone)]
struct FlowEdge {
    to: usize,
    cap: i64,
    cost: i64,
    /// Position of the paired residual edge in `edges[to]`.
    rev: usize,
}

#[derive(Debug, Default)]
struct FlowNetwork {
    edges: Vec<Vec<FlowEdge>>,
}

impl FlowNetwork {
    fn with_nodes(n: usize) -> Self {
        Self {
            edges: vec![Vec::new(); n],
        }
    }

    /// Adds `from → to` and its zero-capacity residual twin. Returns the
    /// position of the forward edge in `edges[from]`.
    fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let forward_pos = self.edges[from].len();
        let backward_pos = self.edges[to].len();
        self.edges[from].push(FlowEdge {
            to,
            cap,
            cost,
            rev: backward_pos,
        });
        self.edges[to].push(FlowEdge {
            to: from,
            cap: 0,
            cost: -cost,
            rev: forward_pos,
        });
        forward_pos
    }

    /// Bellman-Ford queue variant (SPFA) over residual edges. Returns the
    /// predecessor edge of every node reached from `source`.
    fn shortest_path(&self, source: usize) -> (Vec<i64>, Vec<Option<(usize, usize)>>) {
        let n = self.edges.len();
        let mut dist = vec![i64::MAX; n];
        let mut prev: Vec<Option<(usize, usize)>> = vec![None; n];
        let mut in_queue = vec![false; n];
        let mut queue = VecDeque::new();

        dist[source] = 0;
        queue.push_back(source);
        in_queue[source] = true;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            for (pos, edge) in self.edges[u].iter().enumerate() {
                if edge.cap <= 0 {
                    continue;
                }
                let candidate = dist[u] + edge.cost;
                if candidate < dist[edge.to] {
                    dist[edge.to] = candidate;
                    prev[edge.to] = Some((u, pos));
                    if !in_queue[edge.to] {
                        queue.push_back(edge.to);
                        in_queue[edge.to] = true;
                    }
                }
            }
        }

        (dist, prev)
    }

    /// Pushes flow along successive cheapest augmenting paths until the sink
    /// is unreachable. Returns `(flow, cost)`.
    fn run(&mut self, source: usize, sink: usize) -> (i64, i64) {
        let mut flow = 0;
        let mut cost = 0;

        loop {
            let (dist, prev) = self.shortest_path(source);
            if dist[sink] == i64::MAX {
                break;
            }

            let mut bottleneck = i64::MAX;
            let mut v = sink;
            while let Some((u, pos)) = prev[v] {
                bottleneck = bottleneck.min(self.edges[u][pos].cap);
                v = u;
            }

            let mut v = sink;
            while let Some((u, pos)) = prev[v] {
                let rev = self.edges[u][pos].rev;
                self.edges[u][pos].cap -= bottleneck;
                self.edges[v][rev].cap += bottleneck;
                v = u;
            }

            flow += bottleneck;
            cost += bottleneck * dist[sink];
        }

        (flow, cost)
    }
}

/// Optimal assignment that maximises the number of placed patients and,
/// among those placements, minimises total distance.
///
/// Network layout: super-source → patient (cap 1, cost 0), patient →
/// hospital (cap 1, cost = distance in metres), hospital → sink (cap =
/// capacity, cost 0). Hospitals without capacity get no edges at all.
#[derive(Debug, Default)]
pub struct MinCostFlowAssignment;

impl AssignmentAlgorithm for MinCostFlowAssignment {
    fn name(&self) -> &'static str {
        "Min-Cost Max-Flow"
    }

    fn complexity(&self) -> &'static str {
        "O(V^2·E)"
    }

    fn assign(&self, patients: &[PatientRecord], hospitals: &[HospitalRecord]) -> Vec<Assignment> {
        if patients.is_empty() || hospitals.is_empty() {
            return Vec::new();
        }

        let source = 0;
        let patient_node = |p: usize| 1 + p;
        let hospital_node = |h: usize| 1 + patients.len() + h;
        let sink = 1 + patients.len() + hospitals.len();

        let mut network = FlowNetwork::with_nodes(sink + 1);
        // (patient index, hospital index, edge position in the patient's list)
        let mut candidate_edges = Vec::with_capacity(patients.len() * hospitals.len());

        for p in 0..patients.len() {
            network.add_edge(source, patient_node(p), 1, 0);
        }
        for (h, hospital) in hospitals.iter().enumerate() {
            if hospital.capacity == 0 {
                continue;
            }
            network.add_edge(hospital_node(h), sink, i64::from(hospital.capacity), 0);
            for (p, patient) in patients.iter().enumerate() {
                let cost = scaled_cost(patient.distance_km(hospital));
                let pos = network.add_edge(patient_node(p), hospital_node(h), 1, cost);
                candidate_edges.push((p, h, pos));
            }
        }

        let (flow, cost) = network.run(source, sink);
        trace!(flow, cost, "min-cost flow converged");

        let mut hospital_of_patient: Vec<Option<usize>> = vec![None; patients.len()];
        for (p, h, pos) in candidate_edges {
            if network.edges[patient_node(p)][pos].cap == 0 {
                hospital_of_patient[p] = Some(h);
            }
        }

        patients
            .iter()
            .zip(hospital_of_patient)
            .filter_map(|(patient, h)| {
                let hospital = &hospitals[h?];
                Some(Assignment {
                    patient_id: patient.id.clone(),
                    hospital_id: hospital.id.clone(),
                    distance_km: patient.distance_km(hospital),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{total_distance_km, GreedyAssignment, HungarianAssignment};

    #[test]
    fn residual_twins_point_at_each_other() {
        let mut network = FlowNetwork::with_nodes(3);
        let a = network.add_edge(0, 1, 2, 5);
        let b = network.add_edge(1, 2, 1, 3);
        let fwd = &network.edges[0][a];
        assert_eq!(network.edges[1][fwd.rev].to, 0);
        assert_eq!(network.edges[1][fwd.rev].cost, -5);
        let fwd = &network.edges[1][b];
        assert_eq!(network.edges[2][fwd.rev].rev, b);

        assert_eq!(network.run(0, 2), (1, 8));
    }

    #[test]
    fn reroutes_through_residual_edges() {
        // Greedy would send P1 to A; the optimum swaps both patients.
        let patients = vec![
            PatientRecord::new("P1", 0.0, 0.0),
            PatientRecord::new("P2", 0.0, 1.0),
        ];
        let hospitals = vec![
            HospitalRecord::new("A", 0.0, 0.4, 1),
            HospitalRecord::new("B", 0.0, -0.5, 1),
        ];
        let flow = MinCostFlowAssignment.assign(&patients, &hospitals);
        let hungarian = HungarianAssignment.assign(&patients, &hospitals);
        let greedy = GreedyAssignment.assign(&patients, &hospitals);

        assert_eq!(flow, hungarian);
        assert!(total_distance_km(&flow) < total_distance_km(&greedy));
    }

    #[test]
    fn respects_hospital_capacity() {
        let patients: Vec<_> = (0..5)
            .map(|i| PatientRecord::new(format!("P{i}"), 0.0, 0.01 * i as f64))
            .collect();
        let hospitals = vec![
            HospitalRecord::new("H1", 0.0, 0.0, 2),
            HospitalRecord::new("H2", 0.0, 1.0, 1),
            HospitalRecord::new("CLOSED", 0.0, 0.02, 0),
        ];
        let result = MinCostFlowAssignment.assign(&patients, &hospitals);
        assert_eq!(result.len(), 3);
        assert_eq!(result.iter().filter(|a| a.hospital_id == "H1").count(), 2);
        assert!(result.iter().all(|a| a.hospital_id != "CLOSED"));
    }

    #[test]
    fn empty_inputs() {
        let patients = vec![PatientRecord::new("P1", 0.0, 0.0)];
        assert!(MinCostFlowAssignment.assign(&patients, &[]).is_empty());
        assert!(MinCostFlowAssignment
            .assign(&[], &[HospitalRecord::new("H", 0.0, 0.0, 3)])
            .is_empty());
    }
}
