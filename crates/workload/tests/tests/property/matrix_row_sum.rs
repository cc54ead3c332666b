//! Property tests: for any valid behavior model, every matrix row's
//! probabilities stay within the model's bound and cells mirror transitions.

use proptest::prelude::*;
use workload_behavior::{split_cell, MatrixBuilder};
use workload_types::{BehaviorModel, MarkovStateId, MarkovTransition, Service, ThinkTime};

const SERVICES: [&str; 4] = ["Login", "Browse", "Cart", "Checkout"];

fn services() -> Vec<Service> {
    SERVICES.iter().map(|name| Service::named(*name)).collect()
}

/// Per service: up to five (target, weight) pairs, where target 4 is exit.
fn arb_weights() -> impl Strategy<Value = Vec<Vec<(usize, u32)>>> {
    prop::collection::vec(
        prop::collection::vec((0usize..=SERVICES.len(), 1u32..100), 0..5),
        SERVICES.len(),
    )
}

/// Build a model whose per-state probabilities are normalized weights, so
/// each state sums to at most one. Duplicate targets keep the first weight.
fn build(weights: &[Vec<(usize, u32)>], scale: f64) -> BehaviorModel {
    let mut model = BehaviorModel::new("random", "random.csv");
    let states: Vec<MarkovStateId> = SERVICES
        .iter()
        .map(|name| model.add_state(Service::named(*name).id))
        .collect();

    for (from, row) in weights.iter().enumerate() {
        let mut targets: Vec<(usize, u32)> = Vec::new();
        for &(target, weight) in row {
            if !targets.iter().any(|(t, _)| *t == target) {
                targets.push((target, weight));
            }
        }
        let total: u32 = targets.iter().map(|(_, w)| w).sum();
        for (target, weight) in targets {
            let probability = scale * f64::from(weight) / f64::from(total);
            let think_time = ThinkTime::normal(1000.0, 100.0);
            let transition = if target == SERVICES.len() {
                MarkovTransition::to_exit(probability, think_time)
            } else {
                MarkovTransition::to_state(states[target], probability, think_time)
            };
            model.add_transition(states[from], transition).unwrap();
        }
    }
    model
}

proptest! {
    #[test]
    fn row_sums_are_bounded(weights in arb_weights(), scale in 0.0f64..=1.0) {
        prop_assume!(!weights[0].is_empty());
        let services = services();
        let model = build(&weights, scale);

        let matrix = MatrixBuilder::default()
            .build(&services, Some(&services[0].id), &model)
            .unwrap();

        prop_assert_eq!(matrix.row_count(), SERVICES.len());
        prop_assert_eq!(matrix.column_count(), SERVICES.len() + 2);

        for row in matrix.body() {
            let mut service_sum = 0.0;
            let mut total = 0.0;
            for (column, cell) in row.iter().enumerate().skip(1) {
                let (probability, think_time) = split_cell(cell).unwrap();
                prop_assert!((0.0..=1.0).contains(&probability));
                prop_assert!(think_time.starts_with("n("));
                if column <= SERVICES.len() {
                    service_sum += probability;
                }
                total += probability;
            }
            prop_assert!(service_sum <= 1.0 + 1e-9);
            prop_assert!(total <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn cells_mirror_transitions(weights in arb_weights()) {
        prop_assume!(!weights[0].is_empty());
        let services = services();
        let model = build(&weights, 1.0);

        let matrix = MatrixBuilder::default()
            .build(&services, Some(&services[0].id), &model)
            .unwrap();

        for (row_index, state) in model.states.iter().enumerate() {
            let row = &matrix.body()[row_index];
            let declared: usize = state.transitions.len();
            let non_zero = row
                .iter()
                .skip(1)
                .filter(|cell| !cell.ends_with("n(0 0)"))
                .count();
            prop_assert_eq!(non_zero, declared);
        }
    }
}
