//! Behavior matrix error types

use std::path::PathBuf;
use workload_types::{ModelError, ThinkTimeKind};

/// Errors scoped to building or writing the matrix of one behavior model
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    #[error("No think time formatter registered for '{kind}' (behavior model '{model}')")]
    UnknownThinkTimeType { model: String, kind: ThinkTimeKind },

    #[error("Initial state of behavior model '{0}' has no outgoing transitions")]
    EmptyInitialState(String),

    #[error("Invalid matrix configuration: {0}")]
    InvalidConfig(String),

    #[error("Label '{label}' of behavior model '{model}' contains the delimiter '{delimiter}'")]
    UnrepresentableLabel {
        model: String,
        label: String,
        delimiter: char,
    },

    #[error("Matrix file '{filename}' of behavior model '{model}' is already used in this mix")]
    DuplicateFilename { model: String, filename: String },

    #[error("Invalid behavior model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("Failed to write matrix of '{model}' to {}: {source}", path.display())]
    MatrixWrite {
        model: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for behavior matrix operations
pub type BehaviorResult<T> = Result<T, BehaviorError>;
