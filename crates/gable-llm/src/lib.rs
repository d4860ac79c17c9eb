//! # gable-llm
//!
//! Generative-component protocol for the Gable tenancy agent.
//!
//! The agent calls a provider with a compiled instruction set, the
//! conversation so far, and the fixed four-tool schema; the provider
//! answers with either final reply text or structured tool-call requests.
//! The round-trip is a bounded, non-streaming request/response; the
//! runtime owns the timeout and the iteration cap.
//!
//! ## Crate Position
//!
//! Depends on: gable-core. Depended on by: gable-runtime, gable-server.

#![deny(unsafe_code)]

pub mod anthropic;
pub mod errors;
pub mod protocol;
pub mod provider;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use errors::LlmError;
pub use protocol::{ChatMessage, ChatRequest, ContentBlock, ModelReply, Role};
pub use provider::LlmProvider;
