//! LLM provider errors.

use thiserror::Error;

/// Errors from the generative round-trip.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure.
    #[error("llm transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("llm api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body, as returned.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed llm response: {0}")]
    MalformedResponse(String),
}
