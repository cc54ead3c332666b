//! Plan sinks.
//!
//! A sink receives the finished [`ExecutionPlan`]. The compiler itself never
//! decides where a plan goes; hosts pass a sink to
//! [`WorkloadCompiler::compile_into`](crate::WorkloadCompiler::compile_into).

use crate::error::{CompilerError, CompilerResult};
use crate::types::ExecutionPlan;
use std::path::{Path, PathBuf};

/// Receiver of compiled plans.
pub trait PlanSink {
    fn accept(&self, plan: &ExecutionPlan) -> CompilerResult<()>;
}

/// Writes plans as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonPlanWriter {
    path: PathBuf,
}

impl JsonPlanWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanSink for JsonPlanWriter {
    fn accept(&self, plan: &ExecutionPlan) -> CompilerResult<()> {
        let json = serde_json::to_string_pretty(plan)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CompilerError::PlanWrite {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| CompilerError::PlanWrite {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(plan = %plan.id, path = %self.path.display(), "Plan written");
        Ok(())
    }
}
