//! Workload compiler orchestrator.
//!
//! `WorkloadCompiler` drives the full pipeline:
//! validate model → lower session graph → build behavior matrices → assemble plan.
//! Lowering errors abort before anything is written; behavior matrix
//! failures are confined to their model and reported in the mix report.

use crate::config::CompilerConfig;
use crate::error::CompilerResult;
use crate::session::SessionLowering;
use crate::sink::PlanSink;
use crate::transformer::RequestTransformers;
use crate::types::{ExecutionPlan, PlanId};
use chrono::Utc;
use workload_behavior::{MatrixBuilder, MixReport, ThinkTimeFormatters};
use workload_types::WorkloadModel;

// ── Compilation Artifact ────────────────────────────────────────────

/// Everything one compile produced.
#[derive(Debug)]
pub struct CompilationArtifact {
    pub plan: ExecutionPlan,
    /// Per-model outcome of the matrix builder.
    pub mix_report: MixReport,
}

impl CompilationArtifact {
    /// True when every behavior model produced a matrix.
    pub fn is_complete(&self) -> bool {
        self.mix_report.is_complete()
    }
}

// ── Workload Compiler ───────────────────────────────────────────────

/// Compiles workload models into execution plans and behavior matrices.
#[derive(Debug)]
pub struct WorkloadCompiler {
    config: CompilerConfig,
    transformers: RequestTransformers,
    matrix_builder: MatrixBuilder,
}

impl WorkloadCompiler {
    /// Create a compiler with the built-in transformers and formatters.
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_registries(
            config,
            RequestTransformers::with_defaults(),
            ThinkTimeFormatters::with_defaults(),
        )
    }

    /// Create a compiler with caller-supplied registries.
    pub fn with_registries(
        config: CompilerConfig,
        transformers: RequestTransformers,
        formatters: ThinkTimeFormatters,
    ) -> Self {
        let matrix_builder = MatrixBuilder::new(config.matrix.clone(), formatters);
        Self {
            config,
            transformers,
            matrix_builder,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn transformers(&self) -> &RequestTransformers {
        &self.transformers
    }

    pub fn matrix_builder(&self) -> &MatrixBuilder {
        &self.matrix_builder
    }

    /// Validate and lower the session graph, without touching the
    /// behavior mix.
    pub fn lower(&self, model: &WorkloadModel) -> CompilerResult<ExecutionPlan> {
        model.validate()?;

        let lowered =
            SessionLowering::new(&self.transformers, &self.config.plan).lower(&model.session)?;

        let plan = ExecutionPlan {
            id: PlanId::new(),
            name: model.name.clone(),
            generated_at: Utc::now(),
            initial: lowered.initial,
            session_nodes: lowered.nodes,
            behavior_mix: Vec::new(),
            warnings: lowered.warnings,
        };

        tracing::debug!(
            plan = %plan.id,
            model = %model.name,
            nodes = plan.node_count(),
            requests = plan.request_count(),
            warnings = plan.warnings.len(),
            "Session graph lowered"
        );
        Ok(plan)
    }

    /// Compile a model: lower it, then write one matrix per behavior model
    /// into the configured output directory.
    pub fn compile(&self, model: &WorkloadModel) -> CompilerResult<CompilationArtifact> {
        self.config.validate()?;
        let mut plan = self.lower(model)?;

        let session = &model.session;
        let initial_service = session.initial_service().map(|s| &s.id);
        let mix_report = self.matrix_builder.build_mix(
            session.services(),
            initial_service,
            &model.behavior_mix,
            &self.config.output_dir,
        );
        plan.behavior_mix = mix_report.entries.clone();

        tracing::info!(
            plan = %plan.id,
            model = %model.name,
            nodes = plan.node_count(),
            matrices = mix_report.entries.len(),
            failed = mix_report.failures.len(),
            "Workload compiled"
        );
        Ok(CompilationArtifact { plan, mix_report })
    }

    /// Compile a model and hand the plan to `sink`.
    pub fn compile_into(
        &self,
        model: &WorkloadModel,
        sink: &dyn PlanSink,
    ) -> CompilerResult<CompilationArtifact> {
        let artifact = self.compile(model)?;
        sink.accept(&artifact.plan)?;
        Ok(artifact)
    }
}

impl Default for WorkloadCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
