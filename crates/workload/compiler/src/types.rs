//! Execution plan types.
//!
//! The plan is the acyclic output of lowering: one [`SessionNode`] per
//! reachable session state, each holding its [`RequestNode`]s and a complete
//! transition table with one [`TransitionEntry`] per session node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use workload_behavior::BehaviorMixEntry;
use workload_types::{HttpMethod, RequestParameter, ServiceId};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a generated plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

impl PlanId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plan:{}", self.0)
    }
}

/// Position of a session node in the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionNodeId(pub usize);

impl SessionNodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SessionNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

// ── Execution Plan ───────────────────────────────────────────────────

/// The lowered workload, ready for an element factory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub id: PlanId,
    pub name: String,
    pub generated_at: DateTime<Utc>,
    /// Node of the session graph's initial state.
    pub initial: SessionNodeId,
    /// Session nodes in creation (depth-first) order.
    pub session_nodes: Vec<SessionNode>,
    /// Matrix descriptors of the successfully built behavior models.
    #[serde(default)]
    pub behavior_mix: Vec<BehaviorMixEntry>,
    /// Non-fatal findings of the lowering passes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LoweringWarning>,
}

impl ExecutionPlan {
    pub fn node(&self, id: SessionNodeId) -> Option<&SessionNode> {
        self.session_nodes.get(id.index())
    }

    pub fn node_by_name(&self, name: &str) -> Option<&SessionNode> {
        self.session_nodes.iter().find(|n| n.name == name)
    }

    pub fn initial_node(&self) -> Option<&SessionNode> {
        self.node(self.initial)
    }

    pub fn node_count(&self) -> usize {
        self.session_nodes.len()
    }

    pub fn request_count(&self) -> usize {
        self.session_nodes.iter().map(|n| n.requests.len()).sum()
    }

    /// Pre-order walk over the plan tree.
    pub fn walk(&self) -> Vec<ExecutionNode<'_>> {
        let mut out = Vec::with_capacity(self.node_count() + self.request_count());
        for node in &self.session_nodes {
            out.push(ExecutionNode::Session(node));
            out.extend(node.requests.iter().map(ExecutionNode::Request));
        }
        out
    }
}

/// A borrowed view of one node of the plan tree.
#[derive(Clone, Copy, Debug)]
pub enum ExecutionNode<'a> {
    Session(&'a SessionNode),
    Request(&'a RequestNode),
}

impl<'a> ExecutionNode<'a> {
    /// Name of the node, borrowed from the plan
    pub fn name(&self) -> &'a str {
        match self {
            Self::Session(node) => &node.name,
            Self::Request(node) => &node.name,
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

// ── Session Nodes ────────────────────────────────────────────────────

/// Output node of one application state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionNode {
    pub id: SessionNodeId,
    /// Name of the service the state sits in.
    pub name: String,
    pub service: ServiceId,
    /// Requests issued in this state, in protocol order.
    pub requests: Vec<RequestNode>,
    /// One entry per session node of the plan once completed.
    pub transitions: Vec<TransitionEntry>,
}

impl SessionNode {
    pub fn new(id: SessionNodeId, name: impl Into<String>, service: ServiceId) -> Self {
        Self {
            id,
            name: name.into(),
            service,
            requests: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn transition_to(&self, target: SessionNodeId) -> Option<&TransitionEntry> {
        self.transitions.iter().find(|t| t.target == target)
    }

    pub fn enabled_transitions(&self) -> impl Iterator<Item = &TransitionEntry> {
        self.transitions.iter().filter(|t| t.enabled)
    }
}

/// A row of a session node's transition table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub target: SessionNodeId,
    pub target_name: String,
    /// Conjunction of guard conditions; empty means always enabled.
    pub guard: String,
    /// Parameter updates, `; `-separated.
    pub action: String,
    /// False for placeholders inserted by transition completion.
    pub enabled: bool,
}

impl TransitionEntry {
    pub fn active(
        target: SessionNodeId,
        target_name: impl Into<String>,
        guard: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            target,
            target_name: target_name.into(),
            guard: guard.into(),
            action: action.into(),
            enabled: true,
        }
    }

    /// A disabled placeholder without guard or action.
    pub fn dummy(target: SessionNodeId, target_name: impl Into<String>) -> Self {
        Self {
            target,
            target_name: target_name.into(),
            guard: String::new(),
            action: String::new(),
            enabled: false,
        }
    }
}

// ── Request Nodes ────────────────────────────────────────────────────

/// Output node of one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestNode {
    /// The request id.
    pub name: String,
    pub sampler: SamplerSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<AssertionNode>,
}

/// Response assertion attached to a request node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionNode {
    pub name: String,
    pub patterns: Vec<String>,
}

/// Engine-neutral sampler settings produced by a request transformer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sampler", rename_all = "lowercase")]
pub enum SamplerSpec {
    Http {
        method: HttpMethod,
        protocol: String,
        domain: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        path: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<RequestParameter>,
    },
    Java {
        class_name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<RequestParameter>,
    },
    #[serde(rename = "beanshell")]
    BeanShell {
        script: String,
        /// Space-separated script parameters.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        parameters: String,
    },
    #[serde(rename = "junit")]
    JUnit { class_name: String, method: String },
    Soap {
        url: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        soap_action: String,
        envelope: String,
    },
    /// Settings produced by a custom transformer.
    Custom {
        type_name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        properties: BTreeMap<String, String>,
    },
}

// ── Warnings ─────────────────────────────────────────────────────────

/// Structural findings that do not stop lowering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum LoweringWarning {
    /// A protocol state branches; only its first transition was followed.
    NonLinearProtocol {
        service: String,
        request: String,
        branches: usize,
    },
    /// A session state has several transitions to the same target; the
    /// first one was kept.
    DuplicateTransition { source: String, target: String },
}

impl std::fmt::Display for LoweringWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonLinearProtocol {
                service,
                request,
                branches,
            } => write!(
                f,
                "request '{}' in service '{}' has {} outgoing transitions; following the first",
                request, service, branches
            ),
            Self::DuplicateTransition { source, target } => write!(
                f,
                "duplicate transition '{}' -> '{}'; keeping the first",
                source, target
            ),
        }
    }
}
