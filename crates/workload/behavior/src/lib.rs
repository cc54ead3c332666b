//! Behavior mix matrix builder
//!
//! Turns each [`BehaviorModel`](workload_types::BehaviorModel) of a behavior
//! mix into an explicit services × (services ∪ exit) matrix of
//! `"<probability>; <think time>"` cells, writes it as delimited text, and
//! reports a [`BehaviorMixEntry`] per written model.
//!
//! # Components
//!
//! - [`MatrixBuilder`]: builds, writes and batches matrices
//! - [`ThinkTimeFormatters`]: caller-supplied registry of think time renderers
//! - [`MixReport`]: per-model outcome of a batch; failures never stop siblings

#![deny(unsafe_code)]

pub mod errors;
pub mod matrix;
pub mod mix;
pub mod think_time;

pub use errors::{BehaviorError, BehaviorResult};
pub use matrix::{format_probability, split_cell, BehaviorMatrix, MatrixBuilder, MatrixConfig};
pub use mix::{BehaviorMixEntry, MixFailure, MixReport};
pub use think_time::{
    NormalThinkTimeFormatter, ThinkTimeFormatter, ThinkTimeFormatters, UniformThinkTimeFormatter,
};
