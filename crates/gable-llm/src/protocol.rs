//! Request/response types for the generative round-trip.

use gable_core::tools::{ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message author role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Tenant-side input (including tool results fed back).
    User,
    /// Model output.
    Assistant,
}

/// One content block within a chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// A tool invocation requested by the model.
    ToolUse {
        /// Provider-assigned call ID.
        id: String,
        /// Tool name.
        name: String,
        /// Arguments object.
        input: Value,
    },
    /// The executor's answer to a tool invocation.
    ToolResult {
        /// ID of the call being answered.
        tool_use_id: String,
        /// Outcome text.
        content: String,
        /// Set when the action was rejected or failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// One message in the conversation sent to the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Content blocks.
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    /// A plain-text user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// A user message carrying tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// A full request to the generative component.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    /// Compiled instruction set (system prompt).
    pub system: String,
    /// Conversation so far, including tool exchanges from this turn.
    pub messages: Vec<ChatMessage>,
    /// The fixed tool vocabulary (exactly four tools).
    pub tools: Vec<ToolDefinition>,
    /// Output token cap.
    pub max_tokens: u32,
}

/// Why the model stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of reply.
    EndTurn,
    /// The model wants tool results before continuing.
    ToolUse,
    /// Output token cap reached.
    MaxTokens,
}

/// The model's reply: final text, tool-call requests, or both.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelReply {
    /// Raw assistant content blocks (replayed verbatim into the next
    /// request when the turn continues).
    pub content: Vec<ContentBlock>,
    /// Stop reason.
    pub stop_reason: StopReason,
}

impl ModelReply {
    /// Tool calls requested in this reply, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall::new(
                    id.clone(),
                    name.clone(),
                    input.as_object().cloned().unwrap_or_else(Map::new),
                )),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text content of the reply.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Whether the model is waiting on tool results.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse && !self.tool_calls().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_with_tool() -> ModelReply {
        ModelReply {
            content: vec![
                ContentBlock::Text {
                    text: "Checking your account now.".into(),
                },
                ContentBlock::ToolUse {
                    id: "tc_1".into(),
                    name: "query_payment_status".into(),
                    input: json!({"lease_id": "ls_1"}),
                },
            ],
            stop_reason: StopReason::ToolUse,
        }
    }

    #[test]
    fn extracts_tool_calls_in_order() {
        let calls = reply_with_tool().tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "query_payment_status");
        assert_eq!(calls[0].arguments["lease_id"], "ls_1");
    }

    #[test]
    fn text_concatenates_text_blocks_only() {
        assert_eq!(reply_with_tool().text(), "Checking your account now.");
    }

    #[test]
    fn wants_tools_requires_both_reason_and_calls() {
        assert!(reply_with_tool().wants_tools());
        let bare = ModelReply {
            content: vec![ContentBlock::Text { text: "done".into() }],
            stop_reason: StopReason::EndTurn,
        };
        assert!(!bare.wants_tools());
    }
}
