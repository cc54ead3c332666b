//! Session layer: the application-level state machine
//!
//! A [`SessionGraph`] is an EFSM over services. Each [`SessionState`] sits in
//! one service and owns the [`ProtocolGraph`] of requests issued there.
//! Transitions carry guards and actions over typed parameters; the compiler
//! turns those into expression strings for the session controller.

use crate::{ModelError, ModelResult, ProtocolGraph, Service, ServiceId};
use crate::target::{target_repr, TargetRepr};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Identifiers ──────────────────────────────────────────────────────

/// Index of a state in the session graph arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionStateId(pub usize);

impl SessionStateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SessionStateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

// ── Session Graph ────────────────────────────────────────────────────

/// The session-layer graph plus the services it ranges over
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionGraph {
    /// Services in declaration order
    pub services: Vec<Service>,
    /// Arena of states, indexed by [`SessionStateId`]
    #[serde(default)]
    pub states: Vec<SessionState>,
    /// Entry state of every session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<SessionStateId>,
}

impl SessionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a service
    pub fn add_service(&mut self, service: Service) -> ModelResult<()> {
        if self.services.iter().any(|s| s.id == service.id) {
            return Err(ModelError::DuplicateServiceId(service.id));
        }
        self.services.push(service);
        Ok(())
    }

    /// Add a state for a declared service. The first state becomes initial.
    pub fn add_state(&mut self, service: ServiceId, protocol: ProtocolGraph) -> ModelResult<SessionStateId> {
        if self.service(&service).is_none() {
            return Err(ModelError::ServiceNotFound(service));
        }
        let id = SessionStateId(self.states.len());
        self.states.push(SessionState {
            service,
            protocol,
            transitions: Vec::new(),
        });
        if self.initial.is_none() {
            self.initial = Some(id);
        }
        Ok(id)
    }

    pub fn set_initial(&mut self, id: SessionStateId) -> ModelResult<()> {
        if self.state(id).is_none() {
            return Err(ModelError::SessionStateNotFound(id));
        }
        self.initial = Some(id);
        Ok(())
    }

    /// Attach a transition to its source state
    pub fn add_transition(&mut self, transition: SessionTransition) -> ModelResult<()> {
        if let SessionTarget::State(target) = transition.target {
            if self.state(target).is_none() {
                return Err(ModelError::SessionStateNotFound(target));
            }
        }
        let source = transition.source;
        let state = self
            .states
            .get_mut(source.index())
            .ok_or(ModelError::SessionStateNotFound(source))?;
        state.transitions.push(transition);
        Ok(())
    }

    pub fn state(&self, id: SessionStateId) -> Option<&SessionState> {
        self.states.get(id.index())
    }

    pub fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == id)
    }

    /// The service a state sits in
    pub fn service_of(&self, id: SessionStateId) -> Option<&Service> {
        self.state(id).and_then(|state| self.service(&state.service))
    }

    pub fn initial_state(&self) -> Option<&SessionState> {
        self.initial.and_then(|id| self.state(id))
    }

    /// The service of the initial state
    pub fn initial_service(&self) -> Option<&Service> {
        self.initial.and_then(|id| self.service_of(id))
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Validate structural consistency of services, states and transitions
    pub fn validate(&self) -> ModelResult<()> {
        if self.services.is_empty() {
            return Err(ModelError::NoServices);
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(&service.id) {
                return Err(ModelError::DuplicateServiceId(service.id.clone()));
            }
        }

        let initial = self.initial.ok_or(ModelError::NoInitialState)?;
        if self.state(initial).is_none() {
            return Err(ModelError::SessionStateNotFound(initial));
        }

        for (index, state) in self.states.iter().enumerate() {
            let owner = SessionStateId(index);
            if self.service(&state.service).is_none() {
                return Err(ModelError::ServiceNotFound(state.service.clone()));
            }
            for transition in &state.transitions {
                if transition.source != owner {
                    return Err(ModelError::TransitionSourceMismatch {
                        owner,
                        source_state: transition.source,
                    });
                }
                if let SessionTarget::State(target) = transition.target {
                    if self.state(target).is_none() {
                        return Err(ModelError::SessionStateNotFound(target));
                    }
                }
            }
            validate_protocol(owner, &state.protocol)?;
        }

        Ok(())
    }
}

fn validate_protocol(session: SessionStateId, graph: &ProtocolGraph) -> ModelResult<()> {
    if graph.is_empty() {
        return Ok(());
    }
    let initial = graph
        .initial
        .ok_or(ModelError::NoProtocolInitialState { session })?;
    if graph.state(initial).is_none() {
        return Err(ModelError::ProtocolStateNotFound {
            session,
            state: initial,
        });
    }
    for state in &graph.states {
        for transition in &state.transitions {
            if let crate::ProtocolTarget::State(target) = transition.target {
                if graph.state(target).is_none() {
                    return Err(ModelError::ProtocolStateNotFound {
                        session,
                        state: target,
                    });
                }
            }
        }
    }
    Ok(())
}

// ── Session State ────────────────────────────────────────────────────

/// An application state: being inside one service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// The service this state represents
    pub service: ServiceId,
    /// Requests issued while in this state
    #[serde(default)]
    pub protocol: ProtocolGraph,
    /// Outgoing transitions, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<SessionTransition>,
}

// ── Transitions ──────────────────────────────────────────────────────

/// A guarded transition between session states
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransition {
    pub source: SessionStateId,
    pub target: SessionTarget,
    /// Conditions that must all hold for the transition to be taken
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
    /// Parameter updates performed when the transition is taken
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl SessionTransition {
    pub fn new(source: SessionStateId, target: SessionStateId) -> Self {
        Self {
            source,
            target: SessionTarget::State(target),
            guards: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// A transition that ends the session
    pub fn to_exit(source: SessionStateId) -> Self {
        Self {
            source,
            target: SessionTarget::Exit,
            guards: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Where a session transition leads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TargetRepr<SessionStateId>", into = "TargetRepr<SessionStateId>")]
pub enum SessionTarget {
    State(SessionStateId),
    /// Ends the session
    Exit,
}

target_repr!(SessionTarget, SessionStateId);

/// A condition over one parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub parameter: Parameter,
    #[serde(default)]
    pub negate: bool,
}

impl Guard {
    pub fn new(parameter: Parameter) -> Self {
        Self {
            parameter,
            negate: false,
        }
    }

    pub fn negated(parameter: Parameter) -> Self {
        Self {
            parameter,
            negate: true,
        }
    }
}

/// An update of one parameter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub parameter: Parameter,
}

impl Action {
    pub fn new(parameter: Parameter) -> Self {
        Self { parameter }
    }
}

/// A named, typed session variable
///
/// Integer parameters count visits: `target` names the service whose entry
/// increments the counter, `source` the service whose exit decrements it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Parameter {
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Boolean,
            source: None,
            target: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Integer,
            source: None,
            target: None,
        }
    }

    pub fn with_source(mut self, service_name: impl Into<String>) -> Self {
        self.source = Some(service_name.into());
        self
    }

    pub fn with_target(mut self, service_name: impl Into<String>) -> Self {
        self.target = Some(service_name.into());
        self
    }
}

/// Type of a [`Parameter`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Boolean,
    Integer,
}
