//! Protocol lowering pass.
//!
//! Flattens the protocol graph of one session state into the ordered list of
//! request nodes the session node will issue. The protocol layer is expected
//! to be linear; a branching state is reported and only its first declared
//! transition is followed.

use crate::error::CompilerResult;
use crate::transformer::RequestTransformers;
use crate::types::{AssertionNode, LoweringWarning, RequestNode};
use workload_types::{ModelError, ProtocolGraph, ProtocolState, ProtocolTarget};

/// Lowers protocol graphs with a set of request transformers.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolLowering<'a> {
    transformers: &'a RequestTransformers,
}

impl<'a> ProtocolLowering<'a> {
    pub fn new(transformers: &'a RequestTransformers) -> Self {
        Self { transformers }
    }

    /// Walk `graph` from its initial state and emit one request node per
    /// visited state.
    ///
    /// Structural findings are appended to `warnings`. An empty graph lowers
    /// to no requests.
    pub fn lower(
        &self,
        service_name: &str,
        graph: &ProtocolGraph,
        warnings: &mut Vec<LoweringWarning>,
    ) -> CompilerResult<Vec<RequestNode>> {
        let Some(mut current) = graph.initial else {
            return Ok(Vec::new());
        };

        let mut visited = vec![false; graph.state_count()];
        let mut requests = Vec::new();

        loop {
            let state = graph
                .state(current)
                .ok_or(ModelError::UnknownProtocolState(current))?;
            visited[current.index()] = true;
            requests.push(self.request_node(state)?);

            let next = match state.transitions.as_slice() {
                [] => break,
                [only] => only.target,
                [first, ..] => {
                    let warning = LoweringWarning::NonLinearProtocol {
                        service: service_name.to_string(),
                        request: state.request.id.clone(),
                        branches: state.transitions.len(),
                    };
                    tracing::warn!(
                        service = %service_name,
                        request = %state.request.id,
                        branches = state.transitions.len(),
                        "Non-linear protocol state; following first transition"
                    );
                    warnings.push(warning);
                    first.target
                }
            };

            match next {
                ProtocolTarget::State(id) if !visited.get(id.index()).copied().unwrap_or(true) => {
                    current = id;
                }
                ProtocolTarget::State(id) => {
                    if graph.state(id).is_none() {
                        return Err(ModelError::UnknownProtocolState(id).into());
                    }
                    break;
                }
                ProtocolTarget::Exit => break,
            }
        }

        tracing::debug!(
            service = %service_name,
            requests = requests.len(),
            "Lowered protocol"
        );
        Ok(requests)
    }

    fn request_node(&self, state: &ProtocolState) -> CompilerResult<RequestNode> {
        let sampler = self.transformers.transform(&state.request)?;
        let assertion = if state.assertions.is_empty() {
            None
        } else {
            Some(AssertionNode {
                name: format!("{} assertion", state.request.id),
                patterns: state.assertions.iter().map(|a| a.pattern.clone()).collect(),
            })
        };
        Ok(RequestNode {
            name: state.request.id.clone(),
            sampler,
            assertion,
        })
    }
}
