use referral_core::network::{edmonds_karp, kruskal, prim, CapacityNetwork};
use referral_core::paths::{bellman_ford, dijkstra, floyd_warshall, PathResult};
use referral_core::test_helpers::square_graph;

#[test]
fn square_shortest_paths_agree() {
    let graph = square_graph();
    let all_pairs = floyd_warshall(&graph);

    for (end, distance, path) in [
        ("C", 3.0, vec!["A", "B", "C"]),
        ("D", 4.0, vec!["A", "D"]),
    ] {
        let expected = PathResult::Found {
            distance_km: distance,
            path: path.into_iter().map(String::from).collect(),
        };
        assert_eq!(dijkstra(&graph, "A", end), expected);
        assert_eq!(bellman_ford(&graph, "A", end), expected);
        assert_eq!(all_pairs.reconstruct_path("A", end), expected);
    }
}

#[test]
fn square_spanning_trees_and_flow() {
    let graph = square_graph();
    assert_eq!(graph.unique_edges().len(), 4);

    let by_kruskal = kruskal(&graph);
    assert_eq!(by_kruskal.total_cost, 6.0);
    for start in ["A", "C"] {
        assert_eq!(prim(&graph, start).total_cost, by_kruskal.total_cost);
    }

    // Two edge-disjoint routes A-B-C and A-D-C.
    let network = CapacityNetwork::unit_from_graph(&graph);
    assert_eq!(edmonds_karp(&network, "A", "C").unwrap(), 2);
    assert_eq!(edmonds_karp(&network, "A", "A").unwrap(), 0);
}
