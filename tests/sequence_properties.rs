//! Property-based tests for clip graph topology.
//!
//! Covers canonical path discovery, linearity, auto-connect, shuffle and cascading
//! removal over randomly generated graphs.

use std::collections::HashSet;

use cim_domain_clip_graph::{
    check_linearity, find_canonical_path, CanonicalPath, ClipGraph, ClipRecord, Linearity, NodeId,
    Orientation,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn node(index: usize) -> NodeId {
    NodeId::new(format!("clip{index}"))
}

fn graph_of(insertion_order: &[usize], edges: &[(usize, usize)]) -> ClipGraph {
    let mut graph = ClipGraph::new();
    for &index in insertion_order {
        let clip = ClipRecord::new(node(index).as_str(), 1.0 + index as f64).unwrap();
        graph.add_node(clip, None);
    }
    for &(source, target) in edges {
        let _ = graph.connect(node(source), node(target));
    }
    graph
}

fn chain_edges(n: usize) -> Vec<(usize, usize)> {
    (1..n).map(|i| (i - 1, i)).collect()
}

fn permutation(max: usize) -> impl Strategy<Value = Vec<usize>> {
    (1..=max).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

fn assert_single_chain(graph: &ClipGraph) -> Vec<NodeId> {
    let order = match check_linearity(&graph.snapshot()) {
        Linearity::Linear { order } => order,
        other => panic!("Expected a single chain, got {other:?}"),
    };
    let unique: HashSet<&NodeId> = order.iter().collect();
    assert_eq!(unique.len(), graph.node_count());
    assert_eq!(order.len(), graph.node_count());
    order
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Without edges the canonical path holds at most one clip and the rest holds
    /// every other clip.
    #[test]
    fn edgeless_graph_has_trivial_path(order in permutation(10)) {
        let graph = graph_of(&order, &[]);
        let canonical = find_canonical_path(&graph.snapshot());

        prop_assert!(canonical.path().len() <= 1);
        prop_assert_eq!(canonical.path().len() + canonical.rest().len(), order.len());
    }

    /// A chain is linear in chain order whatever order its clips were added in.
    #[test]
    fn chain_is_linear(order in permutation(12)) {
        let n = order.len();
        let graph = graph_of(&order, &chain_edges(n));
        let expected: Vec<NodeId> = (0..n).map(node).collect();

        let snapshot = graph.snapshot();
        let linearity = check_linearity(&snapshot);
        let canonical = find_canonical_path(&snapshot);
        prop_assert_eq!(linearity.order(), Some(expected.as_slice()));
        prop_assert_eq!(canonical.path(), expected.as_slice());
    }

    /// A cycle through every clip leaves no place to start.
    #[test]
    fn full_cycle_has_no_valid_start(n in 2usize..10) {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        let graph = graph_of(&(0..n).collect::<Vec<_>>(), &edges);
        let snapshot = graph.snapshot();

        prop_assert!(
            matches!(find_canonical_path(&snapshot), CanonicalPath::NoValidStart { .. }),
            "expected no valid start"
        );
        prop_assert!(!check_linearity(&snapshot).is_linear());
    }

    /// Two clips without a predecessor are never linear.
    #[test]
    fn two_starts_are_not_linear(n in 2usize..10, joint in 1usize..10) {
        let extra = n;
        let mut edges = chain_edges(n);
        edges.push((extra, joint % (n - 1) + 1));
        let graph = graph_of(&(0..=n).collect::<Vec<_>>(), &edges);

        prop_assert!(!check_linearity(&graph.snapshot()).is_linear());
    }

    /// Auto-connect turns any graph into one chain of N - 1 edges.
    #[test]
    fn auto_connect_builds_single_chain(
        order in permutation(12),
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..30),
        horizontal in any::<bool>(),
    ) {
        let n = order.len();
        let edges: Vec<(usize, usize)> = edges.into_iter().map(|(s, t)| (s % n, t % n)).collect();
        let mut graph = graph_of(&order, &edges);
        let orientation = if horizontal { Orientation::Horizontal } else { Orientation::Vertical };

        graph.auto_connect(orientation);

        prop_assert_eq!(graph.edge_count(), n - 1);
        let chained = assert_single_chain(&graph);
        let inserted: Vec<NodeId> = order.iter().map(|&i| node(i)).collect();
        prop_assert_eq!(chained, inserted);
    }

    /// Shuffling keeps the clip set and chains every clip exactly once.
    #[test]
    fn shuffle_preserves_clips(order in permutation(12), seed in any::<u64>()) {
        let mut graph = graph_of(&order, &chain_edges(order.len()));
        let before: HashSet<NodeId> = graph.nodes().map(|n| n.id.clone()).collect();

        graph.shuffle(Orientation::Vertical, &mut StdRng::seed_from_u64(seed));

        let after: HashSet<NodeId> = graph.nodes().map(|n| n.id.clone()).collect();
        prop_assert_eq!(&before, &after);
        let chained = assert_single_chain(&graph);
        prop_assert_eq!(chained.into_iter().collect::<HashSet<_>>(), before);
    }

    /// Clip ids containing the edge separator still chain into N - 1 distinct edges.
    #[test]
    fn auto_connect_handles_hyphenated_ids(
        raw_ids in prop::collection::hash_set("[a-c-]{1,4}", 1..10),
        seed in any::<u64>(),
    ) {
        let ids: Vec<String> = raw_ids.into_iter().collect();
        let mut graph = ClipGraph::new();
        for raw in &ids {
            graph.add_node(ClipRecord::new(raw.as_str(), 2.0).unwrap(), None);
        }
        for pair in ids.windows(2) {
            prop_assert!(graph.connect(NodeId::new(&pair[1]), NodeId::new(&pair[0])).is_ok());
        }

        graph.shuffle(Orientation::Horizontal, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(graph.edge_count(), ids.len() - 1);
        let chained = assert_single_chain(&graph);
        let expected: HashSet<NodeId> = ids.iter().map(NodeId::new).collect();
        prop_assert_eq!(chained.into_iter().collect::<HashSet<_>>(), expected);
    }

    /// No edge ever references a removed clip.
    #[test]
    fn removal_never_leaves_dangling_edges(
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..24),
        removals in prop::collection::vec(0usize..8, 1..8),
    ) {
        let mut graph = graph_of(&(0..8).collect::<Vec<_>>(), &edges);

        for index in removals {
            graph.remove_node(&node(index));
            for edge in graph.edges() {
                prop_assert!(graph.contains_node(&edge.source));
                prop_assert!(graph.contains_node(&edge.target));
            }
        }
    }
}

#[test]
fn shuffle_produces_different_orders() {
    let mut orders = HashSet::new();
    for seed in 0..20 {
        let mut graph = graph_of(&(0..6).collect::<Vec<_>>(), &[]);
        graph.shuffle(Orientation::Horizontal, &mut StdRng::seed_from_u64(seed));
        orders.insert(graph.nodes().map(|n| n.id.clone()).collect::<Vec<_>>());
    }

    assert!(orders.len() > 1, "20 shuffles of 6 clips all produced the same order");
}
