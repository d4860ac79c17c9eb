//! Runtime errors.

use thiserror::Error;

/// Errors surfaced by the turn pipeline.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Domain-level failure (resolution, scope, validation, timeout).
    #[error(transparent)]
    Core(#[from] gable_core::errors::CoreError),

    /// Store access failed.
    #[error(transparent)]
    Store(#[from] gable_store::StoreError),

    /// The generative round-trip failed at the transport or API level.
    #[error(transparent)]
    Llm(#[from] gable_llm::LlmError),

    /// A tool's infrastructure failed underneath it.
    #[error(transparent)]
    Tool(#[from] gable_tools::ToolError),
}
