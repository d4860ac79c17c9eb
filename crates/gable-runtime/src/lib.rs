//! # gable-runtime
//!
//! Turn orchestration: everything between an inbound tenant message and
//! the outbound reply.
//!
//! A turn runs as a fixed pipeline:
//!
//! 1. [`aggregator`] assembles the point-in-time tenancy snapshot.
//! 2. [`compiler`] deterministically compiles the snapshot into the
//!    instruction set for the generative component.
//! 3. The bounded tool loop in [`runner`] exchanges with the provider,
//!    routing every requested action through the [`executor`] (scope
//!    pre-check, validated execution, action-log append).
//! 4. The reply and conversation state are persisted; lifecycle events
//!    stream out over the [`events`] bus.
//!
//! ## Crate Position
//!
//! Depends on: gable-core, gable-store, gable-notices, gable-llm,
//! gable-tools. Depended on by: gable-server.

#![deny(unsafe_code)]

pub mod aggregator;
pub mod compiler;
pub mod errors;
pub mod events;
pub mod executor;
pub mod runner;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregator::aggregate;
pub use compiler::{InstructionSet, compile};
pub use errors::RuntimeError;
pub use events::EventBus;
pub use executor::ToolExecutor;
pub use runner::{TurnConfig, TurnOutcome, TurnRunner};
