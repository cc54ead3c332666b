//! Workload model types
//!
//! A workload model is a two-level EFSM:
//!
//! - **Session layer**: a [`SessionGraph`] over services. Transitions carry
//!   guards and actions over typed [`Parameter`]s.
//! - **Protocol layer**: per session state, a [`ProtocolGraph`] of the
//!   [`Request`]s issued while in that service.
//!
//! Next to it sits a [`BehaviorMix`]: weighted Markov chains over the same
//! services that drive the probabilistic session controller.
//!
//! All graphs are arenas indexed by typed integer ids, so cycles are plain
//! data and never need shared ownership.

#![deny(unsafe_code)]

mod behavior;
mod errors;
mod model;
mod protocol;
mod service;
mod session;
mod target;

pub use behavior::*;
pub use errors::*;
pub use model::*;
pub use protocol::*;
pub use service::*;
pub use session::*;
