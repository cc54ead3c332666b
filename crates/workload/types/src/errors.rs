//! Error types for workload models

use crate::{MarkovStateId, ProtocolStateId, ServiceId, SessionStateId};

/// Errors raised while building, loading or validating a workload model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model declares no services")]
    NoServices,

    #[error("Duplicate service ID: {0}")]
    DuplicateServiceId(ServiceId),

    #[error("Service not found: {0}")]
    ServiceNotFound(ServiceId),

    #[error("Session graph has no initial state")]
    NoInitialState,

    #[error("Session state not found: {0}")]
    SessionStateNotFound(SessionStateId),

    #[error("Transition stored on {owner} claims source {source_state}")]
    TransitionSourceMismatch {
        owner: SessionStateId,
        source_state: SessionStateId,
    },

    #[error("Protocol graph of {session} has no initial state")]
    NoProtocolInitialState { session: SessionStateId },

    #[error("Protocol state {state} not found in protocol graph of {session}")]
    ProtocolStateNotFound {
        session: SessionStateId,
        state: ProtocolStateId,
    },

    #[error("Protocol state not found: {0}")]
    UnknownProtocolState(ProtocolStateId),

    #[error("Behavior model '{model}' has no initial state")]
    NoMarkovInitialState { model: String },

    #[error("Markov state {state} not found in behavior model '{model}'")]
    MarkovStateNotFound { model: String, state: MarkovStateId },

    #[error("Behavior model '{model}' references unknown service {service}")]
    UnknownMarkovService { model: String, service: ServiceId },

    #[error("Invalid probability {probability} in behavior model '{model}'")]
    InvalidProbability { model: String, probability: f64 },

    #[error("Outgoing probabilities of {service} in behavior model '{model}' sum to {sum}")]
    ProbabilityOverflow {
        model: String,
        service: ServiceId,
        sum: f64,
    },

    #[error("Matrix file '{filename}' of behavior model '{model}' must be a relative path inside the output directory")]
    InvalidMatrixFilename { model: String, filename: String },

    #[error("Unsupported model document format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
