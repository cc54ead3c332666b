//! Compiler error types.
//!
//! Lowering failures abort the whole plan: a partially lowered plan is not
//! a useful artifact. Behavior matrix failures are not listed here; they are
//! scoped to one behavior model and reported through the mix report.

use std::path::PathBuf;
use thiserror::Error;
use workload_types::{ModelError, RequestKindTag};

/// Errors that can occur while compiling a workload model.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// No transformer is registered for a request's sampler family.
    #[error("Unknown request type '{kind}' for request '{request}'")]
    UnknownRequestType { request: String, kind: RequestKindTag },

    /// A transformer rejected a request it is registered for.
    #[error("Invalid request '{request}': {reason}")]
    InvalidRequest { request: String, reason: String },

    /// The model is structurally inconsistent.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Configuration file is not valid TOML.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Plan could not be serialized.
    #[error("Plan serialization failed: {0}")]
    PlanSerialize(#[from] serde_json::Error),

    /// Plan could not be written.
    #[error("Failed to write plan to {}: {source}", path.display())]
    PlanWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tracing subscriber could not be installed.
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),
}

/// Result type for compiler operations.
pub type CompilerResult<T> = Result<T, CompilerError>;
