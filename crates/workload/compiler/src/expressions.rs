//! Guard and action expression synthesis.
//!
//! Guards become a `&&`-conjunction the session controller evaluates before
//! taking a transition. Actions become `;`-separated parameter updates it
//! runs after taking one.

use crate::config::GuardNegation;
use workload_types::{Action, Guard, ParameterKind};

const GUARD_SEPARATOR: &str = " && ";
const ACTION_SEPARATOR: &str = "; ";

/// Render the guard list of a transition. An empty list renders as `""`.
pub fn guard_expression(guards: &[Guard], negation: GuardNegation) -> String {
    guards
        .iter()
        .map(|guard| guard_term(guard, negation))
        .collect::<Vec<_>>()
        .join(GUARD_SEPARATOR)
}

fn guard_term(guard: &Guard, negation: GuardNegation) -> String {
    let name = &guard.parameter.name;
    match guard.parameter.kind {
        ParameterKind::Boolean => {
            let prefixed = match negation {
                GuardNegation::PrefixUnnegated => !guard.negate,
                GuardNegation::PrefixNegated => guard.negate,
            };
            if prefixed {
                format!("!{}", name)
            } else {
                name.clone()
            }
        }
        ParameterKind::Integer => format!("{} > 0", name),
    }
}

/// Render the action list of a transition from `source_service` to
/// `target_service`.
///
/// Integer parameters count up when the transition enters the parameter's
/// target service and down when it leaves its source service; the target
/// check wins. Actions matching neither contribute nothing.
pub fn action_expression(actions: &[Action], source_service: &str, target_service: &str) -> String {
    actions
        .iter()
        .filter_map(|action| action_term(action, source_service, target_service))
        .collect::<Vec<_>>()
        .join(ACTION_SEPARATOR)
}

fn action_term(action: &Action, source_service: &str, target_service: &str) -> Option<String> {
    let parameter = &action.parameter;
    let name = &parameter.name;
    match parameter.kind {
        ParameterKind::Boolean => Some(format!("{}=true", name)),
        ParameterKind::Integer => {
            if parameter.target.as_deref() == Some(target_service) {
                Some(format!("{0}={0}+1", name))
            } else if parameter.source.as_deref() == Some(source_service) {
                Some(format!("{0}={0}-1", name))
            } else {
                None
            }
        }
    }
}
