//! Protocol layer: the requests issued while a user is inside a service
//!
//! Every session state owns a [`ProtocolGraph`]. Its states each carry one
//! [`Request`] and the assertions to check against that request's response.
//! Requests are a closed sum type over the sampler families the plan knows,
//! with an [`RequestKind::Extension`] escape hatch for anything else.

use crate::{ModelError, ModelResult};
use crate::target::{target_repr, TargetRepr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Identifiers ──────────────────────────────────────────────────────

/// Index of a state inside one protocol graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolStateId(pub usize);

impl ProtocolStateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProtocolStateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "protocol:{}", self.0)
    }
}

// ── Protocol Graph ───────────────────────────────────────────────────

/// The nested request graph of one session state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProtocolGraph {
    /// Arena of states, indexed by [`ProtocolStateId`]
    #[serde(default)]
    pub states: Vec<ProtocolState>,
    /// Where request issuing starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<ProtocolStateId>,
}

impl ProtocolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph holding exactly one request
    pub fn single(request: Request) -> Self {
        let mut graph = Self::new();
        graph.add_state(ProtocolState::new(request));
        graph
    }

    /// A graph issuing the given requests one after another
    pub fn linear(requests: impl IntoIterator<Item = Request>) -> Self {
        let mut graph = Self::new();
        let mut previous: Option<ProtocolStateId> = None;
        for request in requests {
            let id = graph.add_state(ProtocolState::new(request));
            if let Some(prev) = previous {
                graph.states[prev.index()]
                    .transitions
                    .push(ProtocolTransition::to_state(id));
            }
            previous = Some(id);
        }
        graph
    }

    /// Add a state; the first state added becomes the initial one
    pub fn add_state(&mut self, state: ProtocolState) -> ProtocolStateId {
        let id = ProtocolStateId(self.states.len());
        self.states.push(state);
        if self.initial.is_none() {
            self.initial = Some(id);
        }
        id
    }

    pub fn set_initial(&mut self, id: ProtocolStateId) -> ModelResult<()> {
        if self.state(id).is_none() {
            return Err(ModelError::UnknownProtocolState(id));
        }
        self.initial = Some(id);
        Ok(())
    }

    /// Add an outgoing transition to `from`
    pub fn add_transition(&mut self, from: ProtocolStateId, target: ProtocolTarget) -> ModelResult<()> {
        if let ProtocolTarget::State(to) = target {
            if self.state(to).is_none() {
                return Err(ModelError::UnknownProtocolState(to));
            }
        }
        let state = self
            .states
            .get_mut(from.index())
            .ok_or(ModelError::UnknownProtocolState(from))?;
        state.transitions.push(ProtocolTransition { target });
        Ok(())
    }

    pub fn state(&self, id: ProtocolStateId) -> Option<&ProtocolState> {
        self.states.get(id.index())
    }

    pub fn initial_state(&self) -> Option<&ProtocolState> {
        self.initial.and_then(|id| self.state(id))
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}

// ── Protocol State ───────────────────────────────────────────────────

/// One request-issuing step of the protocol layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolState {
    /// The request issued in this state
    pub request: Request,
    /// Response checks attached to the request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
    /// Outgoing transitions, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<ProtocolTransition>,
}

impl ProtocolState {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            assertions: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }
}

/// Transition between two protocol states
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolTransition {
    pub target: ProtocolTarget,
}

impl ProtocolTransition {
    pub fn to_state(id: ProtocolStateId) -> Self {
        Self {
            target: ProtocolTarget::State(id),
        }
    }

    pub fn to_exit() -> Self {
        Self {
            target: ProtocolTarget::Exit,
        }
    }
}

/// Where a protocol transition leads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TargetRepr<ProtocolStateId>", into = "TargetRepr<ProtocolStateId>")]
pub enum ProtocolTarget {
    State(ProtocolStateId),
    /// Leaves the protocol layer
    Exit,
}

target_repr!(ProtocolTarget, ProtocolStateId);

/// A pattern to test against a response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub pattern: String,
}

impl Assertion {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

// ── Requests ─────────────────────────────────────────────────────────

/// A request issued by the synthetic user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Identifier, used as the request node name
    pub id: String,
    /// Sampler family and its settings
    pub kind: RequestKind,
}

impl Request {
    pub fn new(id: impl Into<String>, kind: RequestKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// HTTP GET against `domain` + `path`
    pub fn http_get(id: impl Into<String>, domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(
            id,
            RequestKind::Http {
                method: HttpMethod::Get,
                protocol: default_protocol(),
                domain: domain.into(),
                port: None,
                path: path.into(),
                parameters: Vec::new(),
            },
        )
    }
}

/// Name/value pair passed along with a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameter {
    pub name: String,
    pub value: String,
}

impl RequestParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Sampler families a request can belong to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RequestKind {
    Http {
        method: HttpMethod,
        #[serde(default = "default_protocol")]
        protocol: String,
        domain: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        path: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parameters: Vec<RequestParameter>,
    },
    /// RPC-style call into a Java class
    Java {
        class_name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<RequestParameter>,
    },
    /// Script-based request
    #[serde(rename = "beanshell")]
    BeanShell {
        script: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parameters: Vec<String>,
    },
    /// Unit-test-style request
    #[serde(rename = "junit")]
    JUnit { class_name: String, method: String },
    /// XML-RPC-style request
    Soap {
        url: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        soap_action: String,
        envelope: String,
    },
    /// A sampler family only known to a custom transformer
    Extension {
        type_name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        properties: BTreeMap<String, String>,
    },
}

impl RequestKind {
    pub fn tag(&self) -> RequestKindTag {
        match self {
            Self::Http { .. } => RequestKindTag::Http,
            Self::Java { .. } => RequestKindTag::Java,
            Self::BeanShell { .. } => RequestKindTag::BeanShell,
            Self::JUnit { .. } => RequestKindTag::JUnit,
            Self::Soap { .. } => RequestKindTag::Soap,
            Self::Extension { type_name, .. } => RequestKindTag::Extension(type_name.clone()),
        }
    }
}

/// Discriminant of [`RequestKind`], used as a transformer registry key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestKindTag {
    Http,
    Java,
    BeanShell,
    JUnit,
    Soap,
    Extension(String),
}

impl std::fmt::Display for RequestKindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Java => write!(f, "java"),
            Self::BeanShell => write!(f, "beanshell"),
            Self::JUnit => write!(f, "junit"),
            Self::Soap => write!(f, "soap"),
            Self::Extension(name) => write!(f, "extension:{}", name),
        }
    }
}

/// HTTP request method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        };
        write!(f, "{}", s)
    }
}

fn default_protocol() -> String {
    "http".to_string()
}
