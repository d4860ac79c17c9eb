//! Tool-call vocabulary shared between the LLM protocol and the executor.
//!
//! The agent exposes exactly four actions. Their names are fixed constants
//! here; the schemas live with the tool implementations in `gable-tools`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool name: read-only payment/arrears lookup.
pub const TOOL_QUERY_PAYMENT_STATUS: &str = "query_payment_status";
/// Tool name: create an open maintenance request.
pub const TOOL_CREATE_MAINTENANCE_REQUEST: &str = "create_maintenance_request";
/// Tool name: issue a legal notice document.
pub const TOOL_ISSUE_LEGAL_NOTICE: &str = "issue_legal_notice";
/// Tool name: rewrite the tenancy's escalation level.
pub const TOOL_SET_ESCALATION_LEVEL: &str = "set_escalation_level";

/// Confidence floor recorded on agent-created maintenance requests.
pub const MAINTENANCE_CONFIDENCE_FLOOR: f64 = 0.6;

/// A structured action request emitted by the generative component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call ID, echoed back in the result.
    pub id: String,
    /// Tool name (one of the four fixed constants).
    pub name: String,
    /// JSON arguments object.
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Construct a tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Result of executing one tool call, fed back to the generative component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Human/model-readable outcome text.
    pub content: String,
    /// Structured outcome data for the action log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Set when the action was rejected or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Build a successful text result.
pub fn text_result(content: impl Into<String>) -> ToolResult {
    ToolResult {
        content: content.into(),
        details: None,
        is_error: None,
    }
}

/// Build an error result.
pub fn error_result(content: impl Into<String>) -> ToolResult {
    ToolResult {
        content: content.into(),
        details: None,
        is_error: Some(true),
    }
}

/// JSON-schema shape for one tool's input, as sent to the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Always `"object"` for the four gable tools.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property name → schema fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    /// Required property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// One tool definition in the fixed vocabulary sent to the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// What the tool does, in provider-facing prose.
    pub description: String,
    /// Input schema.
    pub parameters: ToolParameterSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_result_sets_flag() {
        let r = error_result("rejected");
        assert_eq!(r.is_error, Some(true));
        assert_eq!(r.content, "rejected");
    }

    #[test]
    fn text_result_has_no_flag() {
        let r = text_result("ok");
        assert_eq!(r.is_error, None);
    }

    #[test]
    fn tool_call_serializes_arguments_object() {
        let mut args = Map::new();
        let _ = args.insert("lease_id".into(), json!("ls_1"));
        let call = ToolCall::new("tc_1", TOOL_QUERY_PAYMENT_STATUS, args);
        let v = serde_json::to_value(&call).unwrap();
        assert_eq!(v["name"], "query_payment_status");
        assert_eq!(v["arguments"]["lease_id"], "ls_1");
    }
}
