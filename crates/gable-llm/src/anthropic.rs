//! Anthropic Messages-API provider.
//!
//! Non-streaming: one POST per round-trip. The runtime's turn loop caps
//! iterations and wraps the call in its own timeout, so this client only
//! carries a generous transport-level timeout.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::errors::LlmError;
use crate::protocol::{ChatRequest, ContentBlock, ModelReply, StopReason};
use crate::provider::LlmProvider;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TRANSPORT_TIMEOUT_SECS: u64 = 60;

/// Provider configuration.
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API base URL (overridable for tests).
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Anthropic Messages-API client.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    http: reqwest::Client,
}

impl AnthropicProvider {
    /// Build a provider from config.
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TRANSPORT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { config, http })
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters,
                })
            })
            .collect();
        json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": request.messages,
            "tools": tools,
        })
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply, LlmError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let content = body
            .content
            .into_iter()
            .map(|block| match block {
                ApiContentBlock::Text { text } => ContentBlock::Text { text },
                ApiContentBlock::ToolUse { id, name, input } => {
                    ContentBlock::ToolUse { id, name, input }
                }
            })
            .collect::<Vec<_>>();

        let stop_reason = match body.stop_reason.as_deref() {
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };
        debug!(blocks = content.len(), ?stop_reason, "provider reply parsed");
        Ok(ModelReply { content, stop_reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ChatMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest {
            system: "You are a tenancy agent.".into(),
            messages: vec![ChatMessage::user_text("When is my rent due?")],
            tools: vec![],
            max_tokens: 1024,
        }
    }

    async fn provider_for(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig {
            base_url: server.uri(),
            api_key: "test-key".into(),
            model: "claude-sonnet-4-5".into(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn parses_final_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "Rent is due on the 1st."}],
                "stop_reason": "end_turn",
            })))
            .mount(&server)
            .await;

        let reply = provider_for(&server).await.complete(&request()).await.unwrap();
        assert_eq!(reply.stop_reason, StopReason::EndTurn);
        assert_eq!(reply.text(), "Rent is due on the 1st.");
        assert!(!reply.wants_tools());
    }

    #[tokio::test]
    async fn parses_tool_use_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "Let me check."},
                    {"type": "tool_use", "id": "tc_9", "name": "query_payment_status",
                     "input": {"lease_id": "ls_1"}},
                ],
                "stop_reason": "tool_use",
            })))
            .mount(&server)
            .await;

        let reply = provider_for(&server).await.complete(&request()).await.unwrap();
        assert!(reply.wants_tools());
        let calls = reply.tool_calls();
        assert_eq!(calls[0].id, "tc_9");
        assert_eq!(calls[0].arguments["lease_id"], "ls_1");
    }

    #[tokio::test]
    async fn api_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.complete(&request()).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("rate limited"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server).await.complete(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }
}
