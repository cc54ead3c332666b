//! Property tests: after completion every session node holds exactly one
//! transition entry per node, enabled exactly when the model has that edge.

use proptest::prelude::*;
use std::collections::HashSet;
use workload_compiler::{PlanConfig, RequestTransformers, SessionLowering};
use workload_tests::graph_from_edges;

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..10).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec((0..count, 0..count), 0..count * 3),
        )
    })
}

proptest! {
    #[test]
    fn exactly_one_entry_per_pair((count, edges) in arb_graph()) {
        let (graph, _) = graph_from_edges(count, &edges);
        let transformers = RequestTransformers::default();
        let config = PlanConfig::default();
        let lowered = SessionLowering::new(&transformers, &config).lower(&graph).unwrap();

        let node_count = lowered.nodes.len();
        for node in &lowered.nodes {
            prop_assert_eq!(node.transitions.len(), node_count);
            for (position, entry) in node.transitions.iter().enumerate() {
                prop_assert_eq!(entry.target.index(), position);
                prop_assert_eq!(&entry.target_name, &lowered.nodes[position].name);
            }
        }
    }

    #[test]
    fn enabled_iff_model_edge((count, edges) in arb_graph()) {
        let (graph, _) = graph_from_edges(count, &edges);
        let transformers = RequestTransformers::default();
        let config = PlanConfig::default();
        let lowered = SessionLowering::new(&transformers, &config).lower(&graph).unwrap();

        let edge_set: HashSet<(String, String)> = edges
            .iter()
            .map(|(from, to)| (format!("S{}", from), format!("S{}", to)))
            .collect();

        for node in &lowered.nodes {
            for entry in &node.transitions {
                let has_edge = edge_set.contains(&(node.name.clone(), entry.target_name.clone()));
                prop_assert_eq!(entry.enabled, has_edge);
                if !entry.enabled {
                    prop_assert!(entry.guard.is_empty());
                    prop_assert!(entry.action.is_empty());
                }
            }
        }
    }

    #[test]
    fn duplicates_are_reported((count, edges) in arb_graph()) {
        let (graph, _) = graph_from_edges(count, &edges);
        let transformers = RequestTransformers::default();
        let config = PlanConfig::default();
        let lowered = SessionLowering::new(&transformers, &config).lower(&graph).unwrap();

        let reached: HashSet<&str> = lowered.nodes.iter().map(|n| n.name.as_str()).collect();
        let mut seen = HashSet::new();
        let duplicates = edges
            .iter()
            .filter(|(from, _)| reached.contains(format!("S{}", from).as_str()))
            .filter(|edge| !seen.insert(**edge))
            .count();
        prop_assert_eq!(lowered.warnings.len(), duplicates);
    }
}
