//! # gable-store
//!
//! SQLite persistence for the Gable tenancy agent.
//!
//! One stateless repository per collection, every method taking a
//! `&Connection`. The [`Store`] wraps an r2d2 pool and is passed explicitly
//! per request; there is no process-wide handle.
//!
//! Writes the agent performs (maintenance request, legal action, escalation
//! level, action-log entry) are each a single statement, so a crash
//! mid-turn never leaves a partial write.
//!
//! ## Crate Position
//!
//! Depends on: gable-core. Depended on by: gable-tools, gable-runtime,
//! gable-server.

#![deny(unsafe_code)]

pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod sql;
pub mod store;

pub use errors::{Result, StoreError};
pub use store::Store;
