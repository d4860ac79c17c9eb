//! Legal action and dispute repositories.

use chrono::{NaiveDate, Utc};
use gable_core::domain::{Dispute, DisputeStatus, LegalAction, LegalActionStatus, NoticeType};
use gable_core::ids::{DisputeId, LeaseId, LegalActionId};
use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::sql::{parse_date_opt, parse_enum, parse_timestamp};

/// Options for recording an issued notice.
pub struct CreateLegalActionOptions<'a> {
    /// Owning lease.
    pub lease_id: &'a LeaseId,
    /// Notice type issued.
    pub notice_type: NoticeType,
    /// Deadline for the tenant to respond.
    pub response_deadline: Option<NaiveDate>,
    /// Why the agent issued it (always non-empty when agent-issued).
    pub agent_reasoning: &'a str,
    /// Reference token of the rendered document.
    pub document_ref: &'a str,
}

/// Legal action repository.
pub struct LegalActionRepo;

impl LegalActionRepo {
    /// Record an issued notice as a single atomic statement. Status
    /// starts at `issued`.
    pub fn create_issued(conn: &Connection, opts: &CreateLegalActionOptions<'_>) -> Result<LegalAction> {
        let action = LegalAction {
            id: LegalActionId::generate(),
            lease_id: opts.lease_id.clone(),
            notice_type: opts.notice_type,
            status: LegalActionStatus::Issued,
            issued_at: Utc::now(),
            response_deadline: opts.response_deadline,
            agent_reasoning: opts.agent_reasoning.to_owned(),
            document_ref: Some(opts.document_ref.to_owned()),
        };
        let _ = conn.execute(
            "INSERT INTO legal_actions (id, lease_id, notice_type, status, issued_at, response_deadline, agent_reasoning, document_ref)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                action.id.as_str(),
                action.lease_id.as_str(),
                action.notice_type.as_str(),
                action.status.as_str(),
                action.issued_at.to_rfc3339(),
                action.response_deadline.map(|d| d.to_string()),
                action.agent_reasoning,
                action.document_ref
            ],
        )?;
        Ok(action)
    }

    /// Actions still in flight (not complied, not expired), newest first.
    pub fn list_open(conn: &Connection, lease_id: &LeaseId) -> Result<Vec<LegalAction>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, notice_type, status, issued_at, response_deadline, agent_reasoning, document_ref
             FROM legal_actions
             WHERE lease_id = ?1 AND status IN ('issued', 'acknowledged', 'escalated')
             ORDER BY issued_at DESC",
        )?;
        let rows = stmt
            .query_map(params![lease_id.as_str()], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LegalAction> {
        Ok(LegalAction {
            id: LegalActionId::from_string(row.get::<_, String>(0)?),
            lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
            notice_type: parse_enum(2, &row.get::<_, String>(2)?, NoticeType::parse)?,
            status: parse_enum(3, &row.get::<_, String>(3)?, LegalActionStatus::parse)?,
            issued_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
            response_deadline: parse_date_opt(5, row.get::<_, Option<String>>(5)?.as_deref())?,
            agent_reasoning: row.get(6)?,
            document_ref: row.get(7)?,
        })
    }
}

/// Dispute repository (read-only from the agent's side).
pub struct DisputeRepo;

impl DisputeRepo {
    /// Insert a dispute.
    pub fn insert(conn: &Connection, dispute: &Dispute) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO disputes (id, lease_id, category, status, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                dispute.id.as_str(),
                dispute.lease_id.as_str(),
                dispute.category,
                dispute.status.as_str(),
                dispute.description
            ],
        )?;
        Ok(())
    }

    /// Disputes not yet closed.
    pub fn list_open(conn: &Connection, lease_id: &LeaseId) -> Result<Vec<Dispute>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, category, status, description
             FROM disputes WHERE lease_id = ?1 AND status != 'closed' ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![lease_id.as_str()], |row| {
                Ok(Dispute {
                    id: DisputeId::from_string(row.get::<_, String>(0)?),
                    lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
                    category: row.get(2)?,
                    status: parse_enum(3, &row.get::<_, String>(3)?, DisputeStatus::parse)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
