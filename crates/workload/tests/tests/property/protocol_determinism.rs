//! Property tests: protocol lowering is deterministic and follows the first
//! declared transition of every branching state.

use proptest::prelude::*;
use workload_compiler::{LoweringWarning, ProtocolLowering, RequestTransformers};
use workload_types::{ProtocolGraph, ProtocolState, ProtocolStateId, ProtocolTarget, Request};

/// Generate a protocol graph: a state count plus, per state, a list of
/// successor choices where `count` stands for exit.
fn arb_protocol() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (1usize..10).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec(prop::collection::vec(0..=count, 0..4), count),
        )
    })
}

fn build(count: usize, successors: &[Vec<usize>]) -> ProtocolGraph {
    let mut graph = ProtocolGraph::new();
    for i in 0..count {
        graph.add_state(ProtocolState::new(Request::http_get(
            format!("r{}", i),
            "shop.local",
            format!("/r{}", i),
        )));
    }
    for (from, targets) in successors.iter().enumerate() {
        for &to in targets {
            let target = if to == count {
                ProtocolTarget::Exit
            } else {
                ProtocolTarget::State(ProtocolStateId(to))
            };
            graph.add_transition(ProtocolStateId(from), target).unwrap();
        }
    }
    graph
}

/// The request ids a first-transition walk visits.
fn first_path(count: usize, successors: &[Vec<usize>]) -> Vec<String> {
    let mut visited = vec![false; count];
    let mut path = Vec::new();
    let mut current = 0;
    loop {
        visited[current] = true;
        path.push(format!("r{}", current));
        match successors[current].first() {
            Some(&next) if next < count && !visited[next] => current = next,
            _ => break,
        }
    }
    path
}

proptest! {
    #[test]
    fn follows_first_transition((count, successors) in arb_protocol()) {
        let graph = build(count, &successors);
        let transformers = RequestTransformers::default();
        let mut warnings = Vec::new();

        let requests = ProtocolLowering::new(&transformers)
            .lower("Service", &graph, &mut warnings)
            .unwrap();

        let names: Vec<String> = requests.iter().map(|r| r.name.clone()).collect();
        let expected = first_path(count, &successors);
        prop_assert_eq!(&names, &expected);

        let branching: Vec<String> = expected
            .iter()
            .filter(|id| {
                let index: usize = id[1..].parse().unwrap();
                successors[index].len() > 1
            })
            .cloned()
            .collect();
        let warned: Vec<String> = warnings
            .iter()
            .map(|w| match w {
                LoweringWarning::NonLinearProtocol { request, .. } => request.clone(),
                other => panic!("unexpected warning {:?}", other),
            })
            .collect();
        prop_assert_eq!(warned, branching);
    }

    #[test]
    fn repeated_lowering_is_identical((count, successors) in arb_protocol()) {
        let graph = build(count, &successors);
        let transformers = RequestTransformers::default();
        let lowering = ProtocolLowering::new(&transformers);

        let mut first_warnings = Vec::new();
        let first = lowering.lower("Service", &graph, &mut first_warnings).unwrap();
        let mut second_warnings = Vec::new();
        let second = lowering.lower("Service", &graph, &mut second_warnings).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_warnings, second_warnings);
    }
}
