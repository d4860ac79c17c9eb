//! Tool trait and execution context.

use std::sync::Arc;

use async_trait::async_trait;
use gable_core::snapshot::TenancyContext;
use gable_core::tools::{ToolDefinition, ToolResult};
use serde_json::Value;

use crate::errors::ToolError;

/// Per-turn execution context handed to every tool.
///
/// Carries the active tenancy snapshot; a tool can only ever see and act
/// on the tenancy the turn was opened for.
#[derive(Clone)]
pub struct ToolContext {
    /// Provider-assigned ID of the call being executed.
    pub tool_call_id: String,
    /// The active tenancy snapshot.
    pub snapshot: Arc<TenancyContext>,
}

impl ToolContext {
    /// The lease the turn is scoped to.
    pub fn lease_id(&self) -> &gable_core::ids::LeaseId {
        &self.snapshot.lease.id
    }
}

/// One of the four agent actions.
#[async_trait]
pub trait GableTool: Send + Sync {
    /// Tool name (one of the fixed constants in `gable_core::tools`).
    fn name(&self) -> &str;

    /// Schema definition sent to the provider.
    fn definition(&self) -> ToolDefinition;

    /// Confidence indicator recorded in the action log for this tool.
    fn confidence(&self) -> f64 {
        1.0
    }

    /// Execute with validated-scope `params`. Domain validation failures
    /// return an error `ToolResult` (recoverable); infrastructure
    /// failures return `Err`.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError>;
}
