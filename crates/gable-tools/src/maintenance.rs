//! Maintenance request creation.

use async_trait::async_trait;
use gable_core::domain::{MaintenanceCategory, Urgency};
use gable_core::tools::{TOOL_CREATE_MAINTENANCE_REQUEST, ToolDefinition, ToolResult, text_result};
use gable_store::Store;
use gable_store::repositories::maintenance::{CreateMaintenanceOptions, MaintenanceRepo};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::errors::ToolError;
use crate::schema::ToolSchemaBuilder;
use crate::traits::{GableTool, ToolContext};
use crate::validation::{validate_enum, validate_required_string};

/// Opens a repair ticket on the active lease. Category and urgency are
/// validated against the closed enums; an unknown value is rejected back
/// to the caller, never defaulted.
pub struct CreateMaintenanceRequestTool {
    store: Store,
}

impl CreateMaintenanceRequestTool {
    /// Build over a store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GableTool for CreateMaintenanceRequestTool {
    fn name(&self) -> &str {
        TOOL_CREATE_MAINTENANCE_REQUEST
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            TOOL_CREATE_MAINTENANCE_REQUEST,
            "Open a maintenance request for a reported repair problem.",
        )
        .required_property(
            "lease_id",
            json!({"type": "string", "description": "The lease the problem was reported on."}),
        )
        .required_property(
            "category",
            json!({
                "type": "string",
                "enum": MaintenanceCategory::all().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                "description": "Problem category.",
            }),
        )
        .required_property(
            "urgency",
            json!({
                "type": "string",
                "enum": Urgency::all().iter().map(|u| u.as_str()).collect::<Vec<_>>(),
                "description": "How urgent the problem is.",
            }),
        )
        .required_property(
            "description",
            json!({"type": "string", "description": "What the tenant reported, in their words."}),
        )
        .build()
    }

    fn confidence(&self) -> f64 {
        0.75
    }

    #[instrument(skip_all, fields(tool_call_id = %ctx.tool_call_id))]
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let category = match validate_enum(
            &params,
            "category",
            "maintenance category",
            MaintenanceCategory::parse,
            "plumbing, electrical, heating, appliance, structural, damp, pest, security, other",
        ) {
            Ok(c) => c,
            Err(rejection) => return Ok(rejection),
        };
        let urgency = match validate_enum(
            &params,
            "urgency",
            "urgency",
            Urgency::parse,
            "emergency, high, routine",
        ) {
            Ok(u) => u,
            Err(rejection) => return Ok(rejection),
        };
        let description = match validate_required_string(&params, "description", "description") {
            Ok(d) => d,
            Err(rejection) => return Ok(rejection),
        };

        let conn = self.store.conn()?;
        let request = MaintenanceRepo::create(
            &conn,
            &CreateMaintenanceOptions {
                lease_id: ctx.lease_id(),
                category,
                urgency,
                description: &description,
            },
        )?;
        info!(request_id = %request.id, %category, %urgency, "maintenance request opened");

        let mut result = text_result(format!(
            "Maintenance request {} opened: {category} ({urgency}).",
            request.id
        ));
        result.details = Some(json!({
            "request_id": request.id.as_str(),
            "category": category.as_str(),
            "urgency": urgency.as_str(),
            "status": request.status.as_str(),
        }));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_ctx, seeded};
    use gable_core::domain::MaintenanceStatus;

    #[tokio::test]
    async fn opens_request_with_open_status() {
        let (store, snapshot) = seeded();
        let tool = CreateMaintenanceRequestTool::new(store.clone());
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({
                    "lease_id": snapshot.lease.id.as_str(),
                    "category": "heating",
                    "urgency": "emergency",
                    "description": "Boiler is dead, no hot water",
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, None);

        let conn = store.conn().unwrap();
        let open = MaintenanceRepo::list_open(&conn, &snapshot.lease.id).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].status, MaintenanceStatus::Open);
        assert_eq!(open[0].urgency, Urgency::Emergency);
    }

    #[tokio::test]
    async fn unknown_category_rejected_not_defaulted() {
        let (store, snapshot) = seeded();
        let tool = CreateMaintenanceRequestTool::new(store.clone());
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({
                    "lease_id": snapshot.lease.id.as_str(),
                    "category": "gardening",
                    "urgency": "high",
                    "description": "Hedge overgrown",
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.content.contains("gardening"));

        let conn = store.conn().unwrap();
        assert!(MaintenanceRepo::list_open(&conn, &snapshot.lease.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_description_rejected() {
        let (store, snapshot) = seeded();
        let tool = CreateMaintenanceRequestTool::new(store);
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(
                json!({
                    "lease_id": snapshot.lease.id.as_str(),
                    "category": "plumbing",
                    "urgency": "routine",
                    "description": "   ",
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn confidence_clears_the_autonomy_floor() {
        let (store, _) = seeded();
        let tool = CreateMaintenanceRequestTool::new(store);
        assert!(tool.confidence() >= gable_core::tools::MAINTENANCE_CONFIDENCE_FLOOR);
    }
}
