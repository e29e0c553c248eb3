mod support;

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use referral_core::geo::NodeKind;
use referral_core::graph::{build_bipartite_knn, build_knn, build_radius};
use referral_core::matching::{
    total_distance_km, AssignmentAlgorithm, GreedyAssignment, HungarianAssignment,
    MinCostFlowAssignment,
};
use referral_core::network::{edmonds_karp, kruskal, prim, CapacityNetwork};
use referral_core::paths::{bellman_ford, dijkstra, floyd_warshall};

use support::approx_eq;
use support::strategies::{hospitals, patients, snapshot};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn knn_out_degree_is_bounded_and_weights_are_haversine(
        nodes in snapshot(14),
        k in 1usize..6,
    ) {
        let graph = build_knn(&nodes, k);
        let n = nodes.len();
        prop_assert_eq!(graph.node_count(), n);

        for (idx, point) in nodes.iter().enumerate() {
            prop_assert_eq!(graph.id(idx), point.id.as_str());
            let edges = graph.edges_from(idx);
            prop_assert!(edges.len() <= k.min(n.saturating_sub(1)));

            let targets: HashSet<usize> = edges.iter().map(|e| e.to).collect();
            prop_assert_eq!(targets.len(), edges.len());
            prop_assert!(!targets.contains(&idx));
            for edge in edges {
                prop_assert_eq!(edge.weight_km, point.distance_km(&nodes[edge.to]));
            }
        }
    }

    #[test]
    fn radius_edges_match_distance_threshold(
        nodes in snapshot(12),
        radius_km in 1.0f64..40.0,
    ) {
        let graph = build_radius(&nodes, radius_km);
        for (i, a) in nodes.iter().enumerate() {
            for (j, b) in nodes.iter().enumerate() {
                let present = graph.weight(&a.id, &b.id).is_some();
                let expected = i != j && a.distance_km(b) <= radius_km;
                prop_assert_eq!(present, expected);
                prop_assert_eq!(present, graph.weight(&b.id, &a.id).is_some());
            }
        }
    }

    #[test]
    fn bipartite_edges_only_run_patient_to_hospital(
        nodes in snapshot(14),
        k in 1usize..5,
    ) {
        let graph = build_bipartite_knn(&nodes, k);
        let kinds: HashMap<&str, NodeKind> =
            nodes.iter().map(|n| (n.id.as_str(), n.kind)).collect();
        let hospital_count = nodes.iter().filter(|n| n.kind == NodeKind::Hospital).count();

        for (from, to, _) in graph.edge_triples() {
            prop_assert_eq!(kinds[graph.id(from)], NodeKind::Patient);
            prop_assert_eq!(kinds[graph.id(to)], NodeKind::Hospital);
        }
        for (idx, point) in nodes.iter().enumerate() {
            if point.kind == NodeKind::Patient {
                prop_assert_eq!(graph.edges_from(idx).len(), k.min(hospital_count));
            }
        }
    }

    #[test]
    fn shortest_path_algorithms_agree(nodes in snapshot(9), k in 1usize..4) {
        let graph = build_knn(&nodes, k);
        let all_pairs = floyd_warshall(&graph);

        for a in &nodes {
            for b in &nodes {
                let d = dijkstra(&graph, &a.id, &b.id);
                let bf = bellman_ford(&graph, &a.id, &b.id);
                let fw = all_pairs.reconstruct_path(&a.id, &b.id);

                prop_assert_eq!(d.is_found(), bf.is_found());
                prop_assert_eq!(d.is_found(), fw.is_found());
                let distances = (d.distance_km(), bf.distance_km(), fw.distance_km());
                if let (Some(x), Some(y), Some(z)) = distances {
                    prop_assert!(approx_eq(x, y), "dijkstra {} vs bellman-ford {}", x, y);
                    prop_assert!(approx_eq(x, z), "dijkstra {} vs floyd-warshall {}", x, z);
                    prop_assert_eq!(d.path().first(), Some(&a.id));
                    prop_assert_eq!(d.path().last(), Some(&b.id));
                }
            }
        }
    }

    #[test]
    fn kruskal_matches_prim_on_connected_symmetric_graphs(
        nodes in snapshot(12),
        k in 1usize..5,
    ) {
        prop_assume!(!nodes.is_empty());
        let graph = build_knn(&nodes, k).symmetrized();
        let from_prim = prim(&graph, &nodes[0].id);
        prop_assume!(from_prim.is_spanning_tree(nodes.len()));

        let from_kruskal = kruskal(&graph);
        prop_assert_eq!(from_kruskal.edges.len(), nodes.len() - 1);
        prop_assert!(approx_eq(from_kruskal.total_cost, from_prim.total_cost));
    }

    #[test]
    fn max_flow_is_bounded_by_endpoint_capacity(
        nodes in snapshot(10),
        k in 1usize..5,
        source_pick in any::<prop::sample::Index>(),
        sink_pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(nodes.len() >= 2);
        let source = &nodes[source_pick.index(nodes.len())].id;
        let sink = &nodes[sink_pick.index(nodes.len())].id;

        let network = CapacityNetwork::unit_from_graph(&build_knn(&nodes, k));
        let flow = edmonds_karp(&network, source, sink).unwrap();
        if source == sink {
            prop_assert_eq!(flow, 0);
        }
        prop_assert!(flow <= network.outgoing_capacity(source));
        prop_assert!(flow <= network.incoming_capacity(sink));
    }

    #[test]
    fn assignments_respect_capacity_and_optimal_beats_greedy(
        patients in patients(8),
        hospitals in hospitals(4),
    ) {
        let capacity: HashMap<&str, u32> =
            hospitals.iter().map(|h| (h.id.as_str(), h.capacity)).collect();
        let total_capacity: usize = hospitals.iter().map(|h| h.capacity as usize).sum();
        let expected = patients.len().min(total_capacity);

        let greedy = GreedyAssignment.assign(&patients, &hospitals);
        let hungarian = HungarianAssignment.assign(&patients, &hospitals);
        let flow = MinCostFlowAssignment.assign(&patients, &hospitals);

        for result in [&greedy, &hungarian, &flow] {
            prop_assert_eq!(result.len(), expected);

            let mut used: HashMap<&str, u32> = HashMap::new();
            let mut seen = HashSet::new();
            for a in result.iter() {
                prop_assert!(seen.insert(a.patient_id.as_str()));
                *used.entry(a.hospital_id.as_str()).or_default() += 1;
            }
            for (hospital, count) in used {
                prop_assert!(count <= capacity[hospital]);
            }
        }

        // Optimal solvers minimise integer metres, so allow half a metre of
        // rounding per assignment.
        let slack = 1e-3 * expected as f64;
        prop_assert!(total_distance_km(&flow) <= total_distance_km(&greedy) + slack);
        prop_assert!(total_distance_km(&hungarian) <= total_distance_km(&greedy) + slack);
        prop_assert!((total_distance_km(&flow) - total_distance_km(&hungarian)).abs() <= slack);
    }
}
