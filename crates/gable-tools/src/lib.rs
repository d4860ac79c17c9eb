//! # gable-tools
//!
//! The agent's action vocabulary: exactly four tools, each independently
//! validated before execution. Validation is never delegated to the
//! generative caller.
//!
//! - [`payments::QueryPaymentStatusTool`]: read-only arrears lookup
//! - [`maintenance::CreateMaintenanceRequestTool`]: opens a repair ticket
//! - [`legal::IssueLegalNoticeTool`]: renders and records a legal notice
//! - [`escalation::SetEscalationLevelTool`]: rewrites the escalation level
//!
//! The cross-tenancy scope pre-check lives in the runtime's executor, not
//! here: tools assume the `lease_id` argument has already been verified
//! against the active [`traits::ToolContext`].
//!
//! ## Crate Position
//!
//! Depends on: gable-core, gable-store, gable-notices. Depended on by:
//! gable-runtime.

#![deny(unsafe_code)]

pub mod errors;
pub mod escalation;
pub mod legal;
pub mod maintenance;
pub mod payments;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use errors::ToolError;
pub use registry::ToolRegistry;
pub use traits::{GableTool, ToolContext};
