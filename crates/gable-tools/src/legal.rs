//! Legal notice issuance.
//!
//! Render → persist artifact → record legal action, in that order. A
//! failure at any stage leaves no partial record behind: the database row
//! is written only after the artifact is durably stored.

use std::sync::Arc;

use async_trait::async_trait;
use gable_core::domain::NoticeType;
use gable_core::tools::{TOOL_ISSUE_LEGAL_NOTICE, ToolDefinition, ToolResult, error_result, text_result};
use gable_notices::artifact::ArtifactStore;
use gable_notices::{NoticeError, NoticeGenerator, NoticeRequest};
use gable_store::Store;
use gable_store::repositories::legal::{CreateLegalActionOptions, LegalActionRepo};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::errors::ToolError;
use crate::schema::ToolSchemaBuilder;
use crate::traits::{GableTool, ToolContext};
use crate::validation::{validate_enum, validate_required_string};

/// Renders a formal legal notice from the active tenancy's facts, stores
/// the document, and records the issuance as a legal action. The reason is
/// mandatory: every agent-issued notice carries its own justification.
pub struct IssueLegalNoticeTool {
    store: Store,
    artifacts: Arc<dyn ArtifactStore>,
}

impl IssueLegalNoticeTool {
    /// Build over a store handle and an artifact destination.
    pub fn new(store: Store, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self { store, artifacts }
    }
}

#[async_trait]
impl GableTool for IssueLegalNoticeTool {
    fn name(&self) -> &str {
        TOOL_ISSUE_LEGAL_NOTICE
    }

    fn definition(&self) -> ToolDefinition {
        ToolSchemaBuilder::new(
            TOOL_ISSUE_LEGAL_NOTICE,
            "Issue a formal legal notice to the tenant. The notice document is generated, stored, and recorded as a legal action.",
        )
        .required_property(
            "lease_id",
            json!({"type": "string", "description": "The lease the notice concerns."}),
        )
        .required_property(
            "notice_type",
            json!({
                "type": "string",
                "enum": NoticeType::all().iter().map(|nt| nt.as_str()).collect::<Vec<_>>(),
                "description": "Which notice to issue.",
            }),
        )
        .required_property(
            "reason",
            json!({"type": "string", "description": "Why this notice is being issued. Recorded verbatim on the legal action."}),
        )
        .build()
    }

    fn confidence(&self) -> f64 {
        0.9
    }

    #[instrument(skip_all, fields(tool_call_id = %ctx.tool_call_id))]
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let notice_type = match validate_enum(
            &params,
            "notice_type",
            "notice type",
            NoticeType::parse,
            "formal_notice, rent_arrears_notice, final_arrears_notice, no_fault_notice, payment_demand, lease_violation_notice, payment_plan_agreement",
        ) {
            Ok(nt) => nt,
            Err(rejection) => return Ok(rejection),
        };
        let reason = match validate_required_string(&params, "reason", "reason") {
            Ok(r) => r,
            Err(rejection) => return Ok(rejection),
        };

        let snapshot = &ctx.snapshot;
        let request = NoticeRequest {
            notice_type,
            jurisdiction: snapshot.unit.jurisdiction,
            tenant_name: snapshot.tenant.full_name.clone(),
            property_address: snapshot.unit.full_address(),
            monthly_rent_pence: snapshot.lease.monthly_rent_pence,
            arrears_pence: snapshot.arrears_pence,
            lease_start: snapshot.lease.start_date,
            lease_end: snapshot.lease.end_date,
            reason: reason.clone(),
            issue_date: snapshot.today,
        };

        let issued = {
            let conn = self.store.conn()?;
            match NoticeGenerator::generate(&conn, &request) {
                Ok(issued) => issued,
                Err(err @ (NoticeError::UnboundPlaceholder { .. } | NoticeError::UnclosedPlaceholder { .. })) => {
                    // A broken stored template must not take the turn down;
                    // the issuance fails and the caller is told.
                    warn!(%notice_type, error = %err, "notice render failed");
                    return Ok(error_result(format!("Notice could not be generated: {err}")));
                }
                Err(err) => return Err(err.into()),
            }
        };

        let locator = self.artifacts.put(&issued.filename, issued.document.as_bytes()).await?;

        let conn = self.store.conn()?;
        let action = LegalActionRepo::create_issued(
            &conn,
            &CreateLegalActionOptions {
                lease_id: ctx.lease_id(),
                notice_type,
                response_deadline: Some(issued.response_deadline),
                agent_reasoning: &reason,
                document_ref: issued.reference.as_str(),
            },
        )?;
        info!(
            action_id = %action.id,
            reference = %issued.reference,
            deadline = %issued.response_deadline,
            locator = %locator,
            "legal notice issued"
        );

        let mut result = text_result(format!(
            "{} issued. The tenant must respond by {}.",
            notice_type,
            issued.response_deadline.format("%-d %B %Y"),
        ));
        result.details = Some(json!({
            "action_id": action.id.as_str(),
            "notice_type": notice_type.as_str(),
            "response_deadline": issued.response_deadline.to_string(),
            "document_ref": issued.reference.as_str(),
            "artifact": locator,
        }));
        Ok(result)
    }
}
