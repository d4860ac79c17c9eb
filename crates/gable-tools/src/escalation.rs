//! Escalation level rewriting.

use async_trait::async_trait;
use gable_core::escalation::EscalationLevel;
use gable_core::tools::{TOOL_SET_ESCALATION_LEVEL, ToolDefinition, ToolResult, error_result, text_result};
use gable_store::Store;
use gable_store::repositories::conversation::ConversationRepo;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::errors::ToolError;
use crate::schema::ToolSchemaBuilder;
use crate::traits::{GableTool, ToolContext};
use crate::validation::{validate_required_string, validate_required_u64};

/// Rewrites the tenancy's escalation level. Movement is unrestricted in
/// both directions; de-escalating after a resolved dispute is as valid as
/// escalating over mounting arrears. Every change carries a reason.
pub struct SetEscalationLevelTool {
    store: Store,
}

impl SetEscalationLevelTool {
    /// Build over a store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GableTool for SetEscalationLevelTool {
    fn name(&self) -> &str {
        TOOL_SET_ESCALATION_LEVEL
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            TOOL_SET_ESCALATION_LEVEL,
            "Move the tenancy to a different escalation level (1 conversational, 2 formal written, 3 legal process, 4 pre-tribunal). De-escalation is allowed.",
        )
        .required_property(
            "lease_id",
            json!({"type": "string", "description": "The lease whose escalation level changes."}),
        )
        .required_property(
            "new_level",
            json!({"type": "integer", "minimum": 1, "maximum": 4, "description": "Target level."}),
        )
        .required_property(
            "reason",
            json!({"type": "string", "description": "Why the level is changing."}),
        )
        .build()
    }

    fn confidence(&self) -> f64 {
        0.9
    }

    #[instrument(skip_all, fields(tool_call_id = %ctx.tool_call_id))]
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let raw_level = match validate_required_u64(&params, "new_level", "escalation level") {
            Ok(n) => n,
            Err(rejection) => return Ok(rejection),
        };
        let Some(new_level) = u8::try_from(raw_level).ok().and_then(EscalationLevel::from_u8)
        else {
            return Ok(error_result(format!(
                "Invalid escalation level {raw_level}: must be between 1 and 4"
            )));
        };
        let reason = match validate_required_string(&params, "reason", "reason") {
            Ok(r) => r,
            Err(rejection) => return Ok(rejection),
        };

        let conn = self.store.conn()?;
        let previous = ConversationRepo::set_escalation_level(&conn, ctx.lease_id(), new_level)?;
        info!(
            previous = previous.as_u8(),
            new = new_level.as_u8(),
            %reason,
            "escalation level changed"
        );

        let mut result = text_result(format!(
            "Escalation level changed from {} ({}) to {} ({}).",
            previous.as_u8(),
            previous.label(),
            new_level.as_u8(),
            new_level.label(),
        ));
        result.details = Some(json!({
            "previous_level": previous.as_u8(),
            "new_level": new_level.as_u8(),
            "reason": reason,
        }));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_ctx, seeded};

    #[tokio::test]
    async fn escalates_and_reports_transition() {
        let (store, snapshot) = seeded();
        let tool = SetEscalationLevelTool::new(store.clone());
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({
                    "lease_id": snapshot.lease.id.as_str(),
                    "new_level": 3,
                    "reason": "Arrears unresolved after final notice",
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, None);
        assert!(result.content.contains("from 1 (conversational) to 3 (legal process)"));

        let conn = store.conn().unwrap();
        let stored = ConversationRepo::get(&conn, &snapshot.lease.id).unwrap().unwrap();
        assert_eq!(stored.open_threads.escalation_level, EscalationLevel::LegalProcess);
    }

    #[tokio::test]
    async fn de_escalation_is_permitted() {
        let (store, snapshot) = seeded();
        let tool = SetEscalationLevelTool::new(store.clone());
        let ctx = make_ctx(&snapshot);

        let _ = tool
            .execute(
                json!({"lease_id": snapshot.lease.id.as_str(), "new_level": 4, "reason": "tribunal prep"}),
                &ctx,
            )
            .await
            .unwrap();
        let result = tool
            .execute(
                json!({"lease_id": snapshot.lease.id.as_str(), "new_level": 1, "reason": "arrears settled in full"}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, None);
        assert_eq!(result.details.unwrap()["previous_level"], 4);

        let conn = store.conn().unwrap();
        let stored = ConversationRepo::get(&conn, &snapshot.lease.id).unwrap().unwrap();
        assert_eq!(stored.open_threads.escalation_level, EscalationLevel::Conversational);
    }

    #[tokio::test]
    async fn out_of_range_level_rejected() {
        let (store, snapshot) = seeded();
        let tool = SetEscalationLevelTool::new(store.clone());
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({"lease_id": snapshot.lease.id.as_str(), "new_level": 5, "reason": "x"}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.content.contains("between 1 and 4"));

        let conn = store.conn().unwrap();
        assert!(ConversationRepo::get(&conn, &snapshot.lease.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_reason_rejected() {
        let (store, snapshot) = seeded();
        let tool = SetEscalationLevelTool::new(store);
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({"lease_id": snapshot.lease.id.as_str(), "new_level": 2}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}
