//! Behavior mix: one matrix per model, failures kept per model

use crate::errors::BehaviorError;
use crate::matrix::MatrixBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use workload_types::{BehaviorMix, Service, ServiceId};

/// Descriptor of one successfully written behavior model, as consumed by
/// the session controller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMixEntry {
    pub name: String,
    pub relative_frequency: f64,
    /// Path of the written matrix file
    pub filename: String,
}

/// A behavior model whose matrix could not be produced
#[derive(Debug)]
pub struct MixFailure {
    pub model: String,
    pub error: BehaviorError,
}

/// Outcome of building all matrices of a mix
#[derive(Debug, Default)]
pub struct MixReport {
    /// Written models, in mix order
    pub entries: Vec<BehaviorMixEntry>,
    /// Failed models, in mix order
    pub failures: Vec<MixFailure>,
}

impl MixReport {
    /// True when every model of the mix was written
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_models(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.model.as_str()).collect()
    }

    pub fn entry(&self, name: &str) -> Option<&BehaviorMixEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl MatrixBuilder {
    /// Build and write the matrix of every model in `mix` into `dir`.
    ///
    /// Each model is attempted independently; a failing model is logged and
    /// recorded without stopping the others. A model whose file name was
    /// already claimed by an earlier model of the mix is rejected.
    pub fn build_mix(
        &self,
        services: &[Service],
        initial_service: Option<&ServiceId>,
        mix: &BehaviorMix,
        dir: &Path,
    ) -> MixReport {
        let mut report = MixReport::default();
        let mut claimed = HashSet::new();

        for weighted in mix.iter() {
            let model = &weighted.model;
            let outcome = if claimed.insert(model.filename.as_str()) {
                self.build(services, initial_service, model)
                    .and_then(|matrix| self.write(&matrix, dir))
            } else {
                Err(BehaviorError::DuplicateFilename {
                    model: model.name.clone(),
                    filename: model.filename.clone(),
                })
            };

            match outcome {
                Ok(path) => report.entries.push(BehaviorMixEntry {
                    name: model.name.clone(),
                    relative_frequency: weighted.relative_frequency,
                    filename: path.display().to_string(),
                }),
                Err(error) => {
                    tracing::error!(model = %model.name, error = %error, "Behavior model skipped");
                    report.failures.push(MixFailure {
                        model: model.name.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            written = report.entries.len(),
            failed = report.failures.len(),
            "Behavior mix built"
        );
        report
    }
}
