//! Tool execution errors.

use thiserror::Error;

/// Errors a tool can surface to the executor.
///
/// Validation failures are NOT errors here; they come back as error
/// results so the generative caller can retry with corrected input.
/// `ToolError` is for infrastructure failures underneath the tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Store access failed.
    #[error(transparent)]
    Store(#[from] gable_store::StoreError),

    /// Notice generation failed.
    #[error(transparent)]
    Notice(#[from] gable_notices::NoticeError),

    /// Writing the rendered notice artifact failed.
    #[error("artifact write failed: {0}")]
    Artifact(#[from] std::io::Error),
}
