//! Agent lifecycle events.
//!
//! [`GableEvent`] values are broadcast by the runtime while a turn runs:
//! turn boundaries, tool execution, notice issuance, escalation changes,
//! and security-relevant rejections. They are transient (the durable audit
//! trail is the action log in the store), but give operators a live view.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::escalation::EscalationLevel;
use crate::tools::ToolResult;

/// Common fields on every event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseEvent {
    /// Lease the turn is scoped to.
    #[serde(rename = "leaseId")]
    pub lease_id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl BaseEvent {
    /// A base event stamped with the current time.
    pub fn now(lease_id: &str) -> Self {
        Self {
            lease_id: lease_id.to_owned(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// High-level agent lifecycle events with tenancy context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GableEvent {
    /// A turn began for an inbound message.
    TurnStarted {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Gateway message ID that triggered the turn.
        #[serde(rename = "providerMessageId")]
        provider_message_id: String,
    },

    /// A tool call entered execution.
    ToolExecutionStart {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Provider-assigned call ID.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool name.
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Arguments as supplied by the model.
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<Value>,
    },

    /// A tool call finished (success or rejection).
    ToolExecutionEnd {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Provider-assigned call ID.
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        /// Tool name.
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Wall-clock duration in milliseconds.
        duration: u64,
        /// Whether the tool reported an error.
        #[serde(rename = "isError")]
        is_error: bool,
        /// Full result.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<ToolResult>,
    },

    /// A tool call named a lease outside the active tenancy and was
    /// rejected. Security-relevant; always accompanied by an action-log
    /// entry.
    ScopeViolationFlagged {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Tool that attempted the cross-tenant action.
        #[serde(rename = "toolName")]
        tool_name: String,
        /// Lease ID the call supplied.
        #[serde(rename = "suppliedLeaseId")]
        supplied_lease_id: String,
    },

    /// A legal notice was issued.
    NoticeIssued {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Notice type text form.
        #[serde(rename = "noticeType")]
        notice_type: String,
        /// Response deadline (ISO date), if the notice carries one.
        #[serde(rename = "responseDeadline", skip_serializing_if = "Option::is_none")]
        response_deadline: Option<String>,
        /// Reference token of the rendered document.
        #[serde(rename = "documentRef")]
        document_ref: String,
    },

    /// The escalation level was rewritten via the escalation tool.
    EscalationChanged {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Level before the change.
        from: EscalationLevel,
        /// Level after the change.
        to: EscalationLevel,
    },

    /// The turn completed and a reply was produced.
    TurnCompleted {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Number of tool calls executed during the turn.
        #[serde(rename = "toolCallCount")]
        tool_call_count: usize,
    },

    /// The turn failed; a generic fallback reply was produced.
    TurnFailed {
        /// Common fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Failure description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_tag_with_snake_case_type() {
        let ev = GableEvent::TurnCompleted {
            base: BaseEvent::now("ls_1"),
            tool_call_count: 2,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "turn_completed");
        assert_eq!(v["leaseId"], "ls_1");
    }

    #[test]
    fn escalation_change_serializes_numeric_levels() {
        let ev = GableEvent::EscalationChanged {
            base: BaseEvent::now("ls_1"),
            from: EscalationLevel::LegalProcess,
            to: EscalationLevel::Conversational,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["from"], 3);
        assert_eq!(v["to"], 1);
    }
}
