//! Workload model compiler
//!
//! Lowers a [`WorkloadModel`](workload_types::WorkloadModel) into an
//! [`ExecutionPlan`]: the cyclic session graph becomes a flat list of session
//! nodes with complete transition tables, each protocol graph becomes an
//! ordered request list, and each behavior model of the mix becomes a
//! probability matrix file.
//!
//! # Pipeline
//!
//! ```text
//! WorkloadModel ──validate──► SessionLowering ──► ExecutionPlan
//!                                  │                    ▲
//!                           ProtocolLowering            │
//!                        (RequestTransformers)          │
//!                                                       │
//! BehaviorMix ────────────► MatrixBuilder ──► MixReport ┘
//! ```
//!
//! Request and think time dispatch goes through registries the caller builds
//! and passes to [`WorkloadCompiler::with_registries`].

#![deny(unsafe_code)]

pub mod compiler;
pub mod config;
pub mod error;
pub mod expressions;
pub mod protocol;
pub mod session;
pub mod sink;
pub mod telemetry;
pub mod transformer;
pub mod types;

pub use compiler::{CompilationArtifact, WorkloadCompiler};
pub use config::{CompilerConfig, GuardNegation, LoggingConfig, PlanConfig};
pub use error::{CompilerError, CompilerResult};
pub use expressions::{action_expression, guard_expression};
pub use protocol::ProtocolLowering;
pub use session::{complete_transition_tables, LoweredSession, SessionLowering};
pub use sink::{JsonPlanWriter, PlanSink};
pub use telemetry::init_tracing;
pub use transformer::{BuiltinRequestTransformer, RequestTransformer, RequestTransformers};
pub use types::{
    AssertionNode, ExecutionNode, ExecutionPlan, LoweringWarning, PlanId, RequestNode, SamplerSpec,
    SessionNode, SessionNodeId, TransitionEntry,
};
