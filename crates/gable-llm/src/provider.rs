//! Provider trait: the seam the runtime mocks in tests.

use async_trait::async_trait;

use crate::errors::LlmError;
use crate::protocol::{ChatRequest, ModelReply};

/// A generative component capable of one bounded request/response cycle.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one round-trip. The caller owns the timeout.
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply, LlmError>;
}
