//! Read-only payment status lookup.

use async_trait::async_trait;
use gable_core::tools::{TOOL_QUERY_PAYMENT_STATUS, ToolDefinition, ToolResult, text_result};
use gable_notices::generator::format_pence;
use gable_store::Store;
use gable_store::repositories::payments::{PaymentPlanRepo, PaymentRepo};
use serde_json::{Value, json};
use tracing::instrument;

use crate::errors::ToolError;
use crate::schema::ToolSchemaBuilder;
use crate::traits::{GableTool, ToolContext};

/// How many payment periods the lookup reports.
const PAYMENT_HISTORY_LEN: usize = 6;

/// Reads current payment state for the active lease: recent periods,
/// cumulative arrears, and any active payment plan. Reads fresh from the
/// store rather than the turn snapshot so a mid-turn lookup reflects
/// writes made earlier in the same turn.
pub struct QueryPaymentStatusTool {
    store: Store,
}

impl QueryPaymentStatusTool {
    /// Build over a store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GableTool for QueryPaymentStatusTool {
    fn name(&self) -> &str {
        TOOL_QUERY_PAYMENT_STATUS
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            TOOL_QUERY_PAYMENT_STATUS,
            "Look up the tenant's payment status: recent rent periods, total arrears, and any active payment plan.",
        )
        .required_property(
            "lease_id",
            json!({"type": "string", "description": "The lease to query. Must be the active tenancy's lease."}),
        )
        .build()
    }

    #[instrument(skip_all, fields(tool_call_id = %ctx.tool_call_id))]
    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let conn = self.store.conn()?;
        let lease_id = ctx.lease_id();
        let payments = PaymentRepo::list_recent(&conn, lease_id, PAYMENT_HISTORY_LEN)?;
        let arrears = PaymentRepo::arrears_total(&conn, lease_id)?;
        let plan = PaymentPlanRepo::active_plan(&conn, lease_id)?;

        let mut lines = vec![format!("Total arrears: {}", format_pence(arrears))];
        match &plan {
            Some(p) => lines.push(format!(
                "Active payment plan: {} per {} installment toward {} arrears",
                format_pence(p.installment_pence),
                p.frequency,
                format_pence(p.total_arrears_pence),
            )),
            None => lines.push("No active payment plan".to_owned()),
        }
        lines.push(format!("Recent periods ({}):", payments.len()));
        for p in &payments {
            lines.push(format!(
                "  {}: due {}, paid {}, outstanding {}, status {}",
                p.due_date.format("%Y-%m"),
                format_pence(p.amount_due_pence),
                p.amount_paid_pence.map_or_else(|| "nothing".to_owned(), format_pence),
                format_pence(p.outstanding_pence()),
                p.status,
            ));
        }

        let mut result = text_result(lines.join("\n"));
        result.details = Some(json!({
            "arrears_pence": arrears,
            "periods_reported": payments.len(),
            "active_plan": plan.as_ref().map(|p| p.id.as_str().to_owned()),
        }));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_ctx, seeded};

    #[tokio::test]
    async fn reports_arrears_and_history() {
        let (store, snapshot) = seeded();
        let tool = QueryPaymentStatusTool::new(store);
        let ctx = make_ctx(&snapshot);

        let result = tool
            .execute(json!({"lease_id": snapshot.lease.id.as_str()}), &ctx)
            .await
            .unwrap();
        assert_eq!(result.is_error, None);
        assert!(result.content.contains("Total arrears: £2400.00"));
        assert!(result.content.contains("No active payment plan"));
        let details = result.details.unwrap();
        assert_eq!(details["arrears_pence"], 240_000);
        assert_eq!(details["periods_reported"], 2);
    }

    #[tokio::test]
    async fn reads_fresh_state_not_the_snapshot() {
        let (store, snapshot) = seeded();
        // Settle one period after the snapshot was taken.
        {
            let conn = store.conn().unwrap();
            let _ = conn
                .execute(
                    "UPDATE payments SET amount_paid_pence = 120000, status = 'paid'
                     WHERE lease_id = ?1 AND due_date = '2026-06-01'",
                    rusqlite::params![snapshot.lease.id.as_str()],
                )
                .unwrap();
        }
        let tool = QueryPaymentStatusTool::new(store);
        let ctx = make_ctx(&snapshot);

        let result = tool.execute(json!({}), &ctx).await.unwrap();
        assert!(result.content.contains("Total arrears: £1200.00"));
    }
}
