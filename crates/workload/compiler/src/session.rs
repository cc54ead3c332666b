//! Session lowering pass.
//!
//! Turns the (possibly cyclic) session graph into the flat list of session
//! nodes of an execution plan:
//!
//! 1. A depth-first walk from the initial state creates one node per
//!    reachable state. Nodes are registered before their successors are
//!    explored, so cycles terminate on the visited map.
//! 2. Each session transition becomes an enabled [`TransitionEntry`] carrying
//!    its guard and action expressions.
//! 3. [`complete_transition_tables`] pads every table with disabled
//!    placeholders so each node lists every node of the plan exactly once.

use crate::config::PlanConfig;
use crate::error::CompilerResult;
use crate::expressions::{action_expression, guard_expression};
use crate::protocol::ProtocolLowering;
use crate::transformer::RequestTransformers;
use crate::types::{LoweringWarning, SessionNode, SessionNodeId, TransitionEntry};
use workload_types::{ModelError, SessionGraph, SessionStateId, SessionTarget};

/// Output of the session lowering pass.
#[derive(Debug, Clone)]
pub struct LoweredSession {
    /// Node of the graph's initial state.
    pub initial: SessionNodeId,
    /// Nodes in depth-first creation order.
    pub nodes: Vec<SessionNode>,
    pub warnings: Vec<LoweringWarning>,
}

/// Lowers session graphs into session nodes.
#[derive(Debug, Clone, Copy)]
pub struct SessionLowering<'a> {
    protocols: ProtocolLowering<'a>,
    config: &'a PlanConfig,
}

impl<'a> SessionLowering<'a> {
    pub fn new(transformers: &'a RequestTransformers, config: &'a PlanConfig) -> Self {
        Self {
            protocols: ProtocolLowering::new(transformers),
            config,
        }
    }

    pub fn lower(&self, graph: &SessionGraph) -> CompilerResult<LoweredSession> {
        let initial_state = graph.initial.ok_or(ModelError::NoInitialState)?;

        let mut node_of: Vec<Option<SessionNodeId>> = vec![None; graph.state_count()];
        let mut order: Vec<SessionStateId> = Vec::new();
        let mut nodes: Vec<SessionNode> = Vec::new();
        let mut warnings = Vec::new();

        let mut stack = vec![initial_state];
        while let Some(state_id) = stack.pop() {
            let slot = node_of
                .get(state_id.index())
                .ok_or(ModelError::SessionStateNotFound(state_id))?;
            if slot.is_some() {
                continue;
            }

            let state = graph
                .state(state_id)
                .ok_or(ModelError::SessionStateNotFound(state_id))?;
            let service = graph
                .service(&state.service)
                .ok_or_else(|| ModelError::ServiceNotFound(state.service.clone()))?;

            let id = SessionNodeId(nodes.len());
            node_of[state_id.index()] = Some(id);

            let mut node = SessionNode::new(id, service.name.clone(), service.id.clone());
            node.requests = self
                .protocols
                .lower(&service.name, &state.protocol, &mut warnings)?;
            tracing::debug!(
                node = %id,
                state = %state_id,
                service = %service.name,
                requests = node.requests.len(),
                "Created session node"
            );
            nodes.push(node);
            order.push(state_id);

            // Reverse push keeps the first declared successor on top.
            for transition in state.transitions.iter().rev() {
                if let SessionTarget::State(target) = transition.target {
                    if node_of.get(target.index()).map_or(true, Option::is_none) {
                        stack.push(target);
                    }
                }
            }
        }

        for (index, state_id) in order.iter().enumerate() {
            let state = graph
                .state(*state_id)
                .ok_or(ModelError::SessionStateNotFound(*state_id))?;
            for transition in &state.transitions {
                let SessionTarget::State(target_state) = transition.target else {
                    continue;
                };
                let target = node_of
                    .get(target_state.index())
                    .copied()
                    .flatten()
                    .ok_or(ModelError::SessionStateNotFound(target_state))?;

                let source_name = nodes[index].name.clone();
                let target_name = nodes[target.index()].name.clone();

                if nodes[index].transition_to(target).is_some() {
                    tracing::warn!(
                        source = %source_name,
                        target = %target_name,
                        "Duplicate session transition; keeping the first"
                    );
                    warnings.push(LoweringWarning::DuplicateTransition {
                        source: source_name,
                        target: target_name,
                    });
                    continue;
                }

                let guard = guard_expression(&transition.guards, self.config.guard_negation);
                let action = action_expression(&transition.actions, &source_name, &target_name);
                nodes[index]
                    .transitions
                    .push(TransitionEntry::active(target, target_name, guard, action));
            }
        }

        complete_transition_tables(&mut nodes);

        let initial = node_of
            .get(initial_state.index())
            .copied()
            .flatten()
            .ok_or(ModelError::SessionStateNotFound(initial_state))?;

        Ok(LoweredSession {
            initial,
            nodes,
            warnings,
        })
    }
}

/// Give every node exactly one entry per node of `nodes`, in node order.
///
/// Enabled entries are kept; every missing pair gets a disabled placeholder.
pub fn complete_transition_tables(nodes: &mut [SessionNode]) {
    let targets: Vec<(SessionNodeId, String)> =
        nodes.iter().map(|n| (n.id, n.name.clone())).collect();

    for node in nodes.iter_mut() {
        let mut existing = std::mem::take(&mut node.transitions);
        node.transitions = targets
            .iter()
            .map(|(id, name)| {
                match existing.iter().position(|e| e.target == *id && e.enabled) {
                    Some(pos) => existing.swap_remove(pos),
                    None => TransitionEntry::dummy(*id, name.clone()),
                }
            })
            .collect();
    }
}
