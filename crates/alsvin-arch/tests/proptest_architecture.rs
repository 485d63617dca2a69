//! Property-based tests for the architecture graph.

use alsvin_arch::{Architecture, Node};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Build an architecture from a node count and an edge list over node
/// indices (self-loops are filtered out).
fn build(n: u32, edges: &[(u32, u32)]) -> Architecture {
    let mut arch = Architecture::new();
    for i in 0..n {
        arch.add_node(Node::new("node", i));
    }
    for &(a, b) in edges {
        let (a, b) = (a % n, b % n);
        if a != b {
            arch.add_connection(Node::new("node", a), Node::new("node", b))
                .unwrap();
        }
    }
    arch
}

fn arb_graph() -> impl Strategy<Value = (u32, Vec<(u32, u32)>)> {
    (2u32..8).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0u32..n, 0u32..n), 0..20),
        )
    })
}

proptest! {
    #[test]
    fn prop_connectivity_symmetric((n, edges) in arb_graph()) {
        let arch = build(n, &edges);
        let conn = arch.get_connectivity();
        for i in 0..arch.n_uids() {
            for j in 0..arch.n_uids() {
                prop_assert_eq!(conn[(i, j)], conn[(j, i)]);
            }
        }
    }

    #[test]
    fn prop_json_roundtrip((n, edges) in arb_graph()) {
        let arch = build(n, &edges);
        let restored = Architecture::from_json(&arch.to_json().unwrap()).unwrap();
        let a: Vec<_> = arch.get_all_uids().collect();
        let b: Vec<_> = restored.get_all_uids().collect();
        prop_assert_eq!(a, b);
        prop_assert_eq!(arch.get_connections_vec(), restored.get_connections_vec());
    }

    #[test]
    fn prop_articulation_points_disconnect((n, edges) in arb_graph()) {
        let arch = build(n, &edges);
        // Only meaningful on connected graphs.
        if arch.get_diameter().is_err() {
            return Ok(());
        }
        for ap in arch.get_articulation_points() {
            let mut pruned = arch.clone();
            pruned.remove_uid(&ap);
            prop_assert!(pruned.get_diameter().is_err());
        }
    }

    #[test]
    fn prop_worst_node_pruning_preserves_connectivity((n, edges) in arb_graph()) {
        let mut arch = build(n, &edges);
        if arch.get_diameter().is_err() {
            return Ok(());
        }
        arch.remove_worst_nodes(2);
        // Whatever was removed, the survivors stay connected.
        if arch.n_uids() > 0 {
            prop_assert!(arch.get_diameter().is_ok());
        }
    }

    #[test]
    fn prop_lines_are_disjoint_paths((n, edges) in arb_graph()) {
        let arch = build(n, &edges);
        let want = (n as usize / 2).max(1);
        let lines = arch.get_lines(vec![want]).unwrap();
        let mut seen = BTreeSet::new();
        for line in &lines {
            prop_assert_eq!(line.len(), want);
            for node in line {
                prop_assert!(seen.insert(node.clone()));
            }
            for pair in line.windows(2) {
                prop_assert!(arch.connection_exists(&pair[0], &pair[1]));
            }
        }
    }
}
