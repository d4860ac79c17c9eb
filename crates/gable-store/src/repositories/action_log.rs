//! Append-only agent action log.
//!
//! The audit trail for a system that can issue legal notices autonomously.
//! This repository exposes insert and list only; no update, no delete.

use chrono::{DateTime, Utc};
use gable_core::ids::{ActionLogId, LeaseId};
use rusqlite::{Connection, params};
use serde_json::Value;

use crate::errors::Result;
use crate::sql::parse_timestamp;

/// One immutable action log entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionLogEntry {
    /// Entry ID.
    pub id: ActionLogId,
    /// Lease the action was scoped to.
    pub lease_id: LeaseId,
    /// Action category (tool name, or `scope_violation`).
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Structured inputs as supplied to the action.
    pub inputs: Value,
    /// Structured outputs/outcome.
    pub outputs: Value,
    /// Confidence indicator recorded by the executor.
    pub confidence: f64,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Options for appending a log entry.
pub struct AppendActionOptions<'a> {
    /// Lease the action was scoped to.
    pub lease_id: &'a LeaseId,
    /// Action category.
    pub category: &'a str,
    /// Human-readable description.
    pub description: &'a str,
    /// Structured inputs.
    pub inputs: Value,
    /// Structured outputs.
    pub outputs: Value,
    /// Confidence indicator.
    pub confidence: f64,
}

/// Action log repository.
pub struct ActionLogRepo;

impl ActionLogRepo {
    /// Append an entry. A single atomic statement.
    pub fn append(conn: &Connection, opts: &AppendActionOptions<'_>) -> Result<ActionLogEntry> {
        let entry = ActionLogEntry {
            id: ActionLogId::generate(),
            lease_id: opts.lease_id.clone(),
            category: opts.category.to_owned(),
            description: opts.description.to_owned(),
            inputs: opts.inputs.clone(),
            outputs: opts.outputs.clone(),
            confidence: opts.confidence,
            created_at: Utc::now(),
        };
        let _ = conn.execute(
            "INSERT INTO action_log (id, lease_id, category, description, inputs, outputs, confidence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id.as_str(),
                entry.lease_id.as_str(),
                entry.category,
                entry.description,
                serde_json::to_string(&entry.inputs)?,
                serde_json::to_string(&entry.outputs)?,
                entry.confidence,
                entry.created_at.to_rfc3339()
            ],
        )?;
        Ok(entry)
    }

    /// All entries for a lease, in insertion order.
    pub fn list(conn: &Connection, lease_id: &LeaseId) -> Result<Vec<ActionLogEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, category, description, inputs, outputs, confidence, created_at
             FROM action_log WHERE lease_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![lease_id.as_str()], |row| {
                let inputs: String = row.get(4)?;
                let outputs: String = row.get(5)?;
                Ok(ActionLogEntry {
                    id: ActionLogId::from_string(row.get::<_, String>(0)?),
                    lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
                    category: row.get(2)?,
                    description: row.get(3)?,
                    inputs: serde_json::from_str(&inputs).unwrap_or(Value::Null),
                    outputs: serde_json::from_str(&outputs).unwrap_or(Value::Null),
                    confidence: row.get(6)?,
                    created_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Count entries for a lease in a given category.
    pub fn count_in_category(conn: &Connection, lease_id: &LeaseId, category: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE lease_id = ?1 AND category = ?2",
            params![lease_id.as_str(), category],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
