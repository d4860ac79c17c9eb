//! Tool execution: the single gate every requested action passes through.
//!
//! Order per call: scope pre-check → registry lookup → tool execution →
//! action-log append. The scope pre-check is here, not in the tools, so no
//! future tool can forget it. Every call that reaches a tool leaves an
//! action-log entry, and a scope violation leaves a security-flagged one.
//! Calls that never identify a target (missing `lease_id`, unknown tool)
//! are rejected with an error result and no entry. Only infrastructure
//! failures propagate as errors.

use std::sync::Arc;
use std::time::Instant;

use gable_core::escalation::EscalationLevel;
use gable_core::events::{BaseEvent, GableEvent};
use gable_core::tools::{
    TOOL_ISSUE_LEGAL_NOTICE, TOOL_SET_ESCALATION_LEVEL, ToolCall, ToolResult, error_result,
};
use gable_store::Store;
use gable_store::repositories::action_log::{ActionLogRepo, AppendActionOptions};
use gable_tools::{ToolContext, ToolRegistry};
use metrics::{counter, histogram};
use serde_json::{Value, json};
use tracing::{instrument, warn};

use crate::errors::RuntimeError;
use crate::events::EventBus;

/// Action-log category for rejected cross-tenancy attempts.
pub const CATEGORY_SCOPE_VIOLATION: &str = "scope_violation";

/// Executes tool calls against the active tenancy.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    store: Store,
    events: EventBus,
}

impl ToolExecutor {
    /// Build over the tool registry and the store the action log lives in.
    pub fn new(registry: Arc<ToolRegistry>, store: Store, events: EventBus) -> Self {
        Self {
            registry,
            store,
            events,
        }
    }

    /// The registered tool definitions, for the provider request.
    pub fn definitions(&self) -> Vec<gable_core::tools::ToolDefinition> {
        self.registry.definitions()
    }

    /// Execute one call. Rejections (scope, validation, unknown tool) come
    /// back as error results; `Err` means infrastructure failed underneath.
    #[instrument(skip_all, fields(tool = %call.name, tool_call_id = %call.id))]
    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &ToolContext,
    ) -> Result<ToolResult, RuntimeError> {
        let lease_id = ctx.lease_id().as_str().to_owned();
        self.events.emit(GableEvent::ToolExecutionStart {
            base: BaseEvent::now(&lease_id),
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: Some(Value::Object(call.arguments.clone())),
        });
        let started = Instant::now();

        let result = self.dispatch(call, ctx).await?;

        let duration = duration_ceil_ms(started);
        let is_error = result.is_error.unwrap_or(false);
        counter!(
            "gable_tool_executions_total",
            "tool" => call.name.clone(),
            "outcome" => if is_error { "rejected" } else { "ok" },
        )
        .increment(1);
        histogram!("gable_tool_duration_ms", "tool" => call.name.clone()).record(duration as f64);
        self.events.emit(GableEvent::ToolExecutionEnd {
            base: BaseEvent::now(&lease_id),
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            duration,
            is_error,
            result: Some(result.clone()),
        });
        Ok(result)
    }

    async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult, RuntimeError> {
        let expected = ctx.lease_id().as_str();

        // Scope pre-check: the supplied lease must be the turn's lease.
        match call.arguments.get("lease_id").and_then(Value::as_str) {
            Some(supplied) if supplied != expected => {
                return self.reject_out_of_scope(call, ctx, supplied);
            }
            Some(_) => {}
            None => {
                return Ok(error_result(format!(
                    "Missing required parameter: 'lease_id' (the active lease is {expected})"
                )));
            }
        }

        let Some(tool) = self.registry.get(&call.name) else {
            return Ok(error_result(format!(
                "Unknown tool '{}': only the registered tenancy actions are available",
                call.name
            )));
        };

        let result = tool
            .execute(Value::Object(call.arguments.clone()), ctx)
            .await?;

        let conn = self.store.conn()?;
        let _ = ActionLogRepo::append(
            &conn,
            &AppendActionOptions {
                lease_id: ctx.lease_id(),
                category: &call.name,
                description: &result.content,
                inputs: Value::Object(call.arguments.clone()),
                outputs: result
                    .details
                    .clone()
                    .unwrap_or_else(|| json!({"content": result.content})),
                confidence: tool.confidence(),
            },
        )?;
        drop(conn);

        if result.is_error.unwrap_or(false) {
            return Ok(result);
        }
        self.emit_domain_event(call, ctx, &result);
        Ok(result)
    }

    fn reject_out_of_scope(
        &self,
        call: &ToolCall,
        ctx: &ToolContext,
        supplied: &str,
    ) -> Result<ToolResult, RuntimeError> {
        let expected = ctx.lease_id().as_str();
        warn!(supplied, expected, tool = %call.name, "cross-tenancy tool call rejected");
        counter!("gable_scope_violations_total", "tool" => call.name.clone()).increment(1);

        let conn = self.store.conn()?;
        let _ = ActionLogRepo::append(
            &conn,
            &AppendActionOptions {
                lease_id: ctx.lease_id(),
                category: CATEGORY_SCOPE_VIOLATION,
                description: &format!(
                    "rejected {} call naming lease {supplied} during a turn for lease {expected}",
                    call.name
                ),
                inputs: Value::Object(call.arguments.clone()),
                outputs: json!({"rejected": true}),
                confidence: 1.0,
            },
        )?;
        self.events.emit(GableEvent::ScopeViolationFlagged {
            base: BaseEvent::now(expected),
            tool_name: call.name.clone(),
            supplied_lease_id: supplied.to_owned(),
        });
        Ok(error_result(format!(
            "Action rejected: this conversation is scoped to lease {expected} and cannot act on {supplied}"
        )))
    }

    fn emit_domain_event(&self, call: &ToolCall, ctx: &ToolContext, result: &ToolResult) {
        let Some(details) = &result.details else {
            return;
        };
        let lease_id = ctx.lease_id().as_str();
        match call.name.as_str() {
            TOOL_ISSUE_LEGAL_NOTICE => {
                self.events.emit(GableEvent::NoticeIssued {
                    base: BaseEvent::now(lease_id),
                    notice_type: details["notice_type"].as_str().unwrap_or_default().to_owned(),
                    response_deadline: details["response_deadline"].as_str().map(str::to_owned),
                    document_ref: details["document_ref"].as_str().unwrap_or_default().to_owned(),
                });
            }
            TOOL_SET_ESCALATION_LEVEL => {
                let level = |key: &str| {
                    details[key]
                        .as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(EscalationLevel::from_u8)
                        .unwrap_or_default()
                };
                self.events.emit(GableEvent::EscalationChanged {
                    base: BaseEvent::now(lease_id),
                    from: level("previous_level"),
                    to: level("new_level"),
                });
            }
            _ => {}
        }
    }
}

/// Elapsed wall-clock milliseconds, rounded up to at least 1.
fn duration_ceil_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX).max(1)
}
