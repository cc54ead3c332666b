//! The complete workload model and its document formats

use crate::{BehaviorMix, ModelError, ModelResult, Service, SessionGraph};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session graph plus behavior mix: everything the compiler consumes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadModel {
    /// Name of the workload, used as the plan name
    pub name: String,
    pub session: SessionGraph,
    #[serde(default)]
    pub behavior_mix: BehaviorMix,
}

impl WorkloadModel {
    pub fn new(name: impl Into<String>, session: SessionGraph) -> Self {
        Self {
            name: name.into(),
            session,
            behavior_mix: BehaviorMix::new(),
        }
    }

    pub fn with_behavior_mix(mut self, mix: BehaviorMix) -> Self {
        self.behavior_mix = mix;
        self
    }

    pub fn services(&self) -> &[Service] {
        self.session.services()
    }

    /// Validate the session and protocol layers.
    ///
    /// Behavior models are validated one by one when their matrices are
    /// built, so that one broken model does not reject the whole workload.
    pub fn validate(&self) -> ModelResult<()> {
        self.session.validate()
    }

    pub fn from_json_str(input: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> ModelResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn to_json_string(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a model document, choosing the format by file extension
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            other => Err(ModelError::UnsupportedFormat(other.to_string())),
        }
    }
}
