//! Conversation context and raw message repositories.
//!
//! The conversation context row is the sole source of truth for the
//! escalation level. [`ConversationRepo::set_escalation_level`] is the only
//! write path for it, and the level update itself is one `UPDATE`
//! statement.

use chrono::Utc;
use gable_core::domain::{MessageDirection, StoredMessage};
use gable_core::escalation::{ConversationContext, EscalationLevel, OpenThreads};
use gable_core::ids::LeaseId;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::errors::Result;
use crate::sql::{parse_enum, parse_timestamp};

/// Conversation context repository.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Load the context row, parsing `open_threads` leniently; malformed
    /// stored state degrades to defaults instead of failing the turn.
    pub fn get(conn: &Connection, lease_id: &LeaseId) -> Result<Option<ConversationContext>> {
        let row = conn
            .query_row(
                "SELECT lease_id, summary, open_threads, updated_at
                 FROM conversation_contexts WHERE lease_id = ?1",
                params![lease_id.as_str()],
                |row| {
                    let raw: String = row.get(2)?;
                    let threads = serde_json::from_str::<Value>(&raw)
                        .map(|v| OpenThreads::from_stored(&v))
                        .unwrap_or_default();
                    Ok(ConversationContext {
                        lease_id: LeaseId::from_string(row.get::<_, String>(0)?),
                        summary: row.get(1)?,
                        open_threads: threads,
                        updated_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Ensure a context row exists for the lease.
    pub fn ensure(conn: &Connection, lease_id: &LeaseId) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO conversation_contexts (lease_id, summary, open_threads, updated_at)
             VALUES (?1, '', '{}', ?2)
             ON CONFLICT(lease_id) DO NOTHING",
            params![lease_id.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Replace the rolling summary.
    pub fn update_summary(conn: &Connection, lease_id: &LeaseId, summary: &str) -> Result<()> {
        Self::ensure(conn, lease_id)?;
        let _ = conn.execute(
            "UPDATE conversation_contexts SET summary = ?1, updated_at = ?2 WHERE lease_id = ?3",
            params![summary, Utc::now().to_rfc3339(), lease_id.as_str()],
        )?;
        Ok(())
    }

    /// Rewrite the escalation level, preserving extension keys. Returns
    /// the previous level (defaulting to level 1 where the stored value
    /// was absent or malformed). The level write is a single `UPDATE`.
    pub fn set_escalation_level(
        conn: &Connection,
        lease_id: &LeaseId,
        level: EscalationLevel,
    ) -> Result<EscalationLevel> {
        Self::ensure(conn, lease_id)?;
        let previous = Self::get(conn, lease_id)?
            .map(|ctx| ctx.open_threads.escalation_level)
            .unwrap_or_default();
        let _ = conn.execute(
            "UPDATE conversation_contexts
             SET open_threads = json_set(
                     CASE WHEN json_valid(open_threads) THEN open_threads ELSE '{}' END,
                     '$.escalation_level', ?1),
                 updated_at = ?2
             WHERE lease_id = ?3",
            params![
                i64::from(level.as_u8()),
                Utc::now().to_rfc3339(),
                lease_id.as_str()
            ],
        )?;
        Ok(previous)
    }
}

/// Raw dialogue message repository.
pub struct MessageRepo;

impl MessageRepo {
    /// Record an inbound tenant message. Returns `false` when the provider
    /// message ID was already stored (gateway redelivery).
    pub fn insert_inbound(
        conn: &Connection,
        lease_id: &LeaseId,
        provider_message_id: &str,
        body: &str,
    ) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO messages (lease_id, direction, provider_message_id, body, created_at)
             VALUES (?1, 'inbound', ?2, ?3, ?4)",
            params![lease_id.as_str(), provider_message_id, body, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Record the agent's outbound reply, linked to the inbound message it
    /// answers (the idempotency short-circuit reads it back by that link).
    pub fn insert_outbound(
        conn: &Connection,
        lease_id: &LeaseId,
        reply_to_provider_id: &str,
        body: &str,
    ) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO messages (lease_id, direction, reply_to_provider_id, body, created_at)
             VALUES (?1, 'outbound', ?2, ?3, ?4)",
            params![lease_id.as_str(), reply_to_provider_id, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// The stored reply to a previously processed inbound message, if any.
    pub fn reply_for(conn: &Connection, provider_message_id: &str) -> Result<Option<String>> {
        let row = conn
            .query_row(
                "SELECT body FROM messages
                 WHERE direction = 'outbound' AND reply_to_provider_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![provider_message_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row)
    }

    /// The most recent `limit` messages, returned chronologically.
    pub fn list_recent(conn: &Connection, lease_id: &LeaseId, limit: usize) -> Result<Vec<StoredMessage>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, direction, provider_message_id, body, created_at
             FROM messages WHERE lease_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let mut rows = stmt
            .query_map(params![lease_id.as_str(), limit as i64], |row| {
                Ok(StoredMessage {
                    id: row.get(0)?,
                    lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
                    direction: parse_enum(2, &row.get::<_, String>(2)?, MessageDirection::parse)?,
                    provider_message_id: row.get(3)?,
                    body: row.get(4)?,
                    created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.reverse();
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::repositories::tenancy::tests::{seed_tenancy, setup};

    #[test]
    fn escalation_round_trips() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900040");
        let previous =
            ConversationRepo::set_escalation_level(&conn, &lease_id, EscalationLevel::LegalProcess)
                .unwrap();
        assert_eq!(previous, EscalationLevel::Conversational);

        let ctx = ConversationRepo::get(&conn, &lease_id).unwrap().unwrap();
        assert_eq!(ctx.open_threads.escalation_level, EscalationLevel::LegalProcess);
    }

    #[test]
    fn de_escalation_returns_previous_level() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900041");
        ConversationRepo::set_escalation_level(&conn, &lease_id, EscalationLevel::LegalProcess)
            .unwrap();
        let previous =
            ConversationRepo::set_escalation_level(&conn, &lease_id, EscalationLevel::Conversational)
                .unwrap();
        assert_eq!(previous, EscalationLevel::LegalProcess);
    }

    #[test]
    fn malformed_stored_level_degrades_to_one() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900042");
        ConversationRepo::ensure(&conn, &lease_id).unwrap();
        // "three" instead of 3; the lenient parse must not error.
        conn.execute(
            "UPDATE conversation_contexts SET open_threads = '{\"escalation_level\": \"three\"}'
             WHERE lease_id = ?1",
            params![lease_id.as_str()],
        )
        .unwrap();
        let ctx = ConversationRepo::get(&conn, &lease_id).unwrap().unwrap();
        assert_eq!(ctx.open_threads.escalation_level, EscalationLevel::Conversational);
    }

    #[test]
    fn escalation_write_preserves_extension_keys() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900043");
        ConversationRepo::ensure(&conn, &lease_id).unwrap();
        conn.execute(
            "UPDATE conversation_contexts
             SET open_threads = '{\"escalation_level\": 2, \"deposit_query\": \"open\"}'
             WHERE lease_id = ?1",
            params![lease_id.as_str()],
        )
        .unwrap();
        ConversationRepo::set_escalation_level(&conn, &lease_id, EscalationLevel::PreTribunal)
            .unwrap();
        let ctx = ConversationRepo::get(&conn, &lease_id).unwrap().unwrap();
        assert_eq!(ctx.open_threads.escalation_level, EscalationLevel::PreTribunal);
        assert_eq!(
            ctx.open_threads.extra.get("deposit_query").map(String::as_str),
            Some("open")
        );
    }

    #[test]
    fn inbound_redelivery_is_ignored() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900044");
        assert!(MessageRepo::insert_inbound(&conn, &lease_id, "wamid.1", "hello").unwrap());
        assert!(!MessageRepo::insert_inbound(&conn, &lease_id, "wamid.1", "hello").unwrap());
    }

    #[test]
    fn reply_lookup_by_provider_id() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900045");
        MessageRepo::insert_inbound(&conn, &lease_id, "wamid.2", "when is rent due?").unwrap();
        MessageRepo::insert_outbound(&conn, &lease_id, "wamid.2", "Rent is due on the 1st.").unwrap();
        assert_eq!(
            MessageRepo::reply_for(&conn, "wamid.2").unwrap().as_deref(),
            Some("Rent is due on the 1st.")
        );
        assert!(MessageRepo::reply_for(&conn, "wamid.unknown").unwrap().is_none());
    }

    #[test]
    fn list_recent_is_chronological() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900046");
        for i in 0..25 {
            MessageRepo::insert_inbound(&conn, &lease_id, &format!("wamid.{i}"), &format!("m{i}"))
                .unwrap();
        }
        let recent = MessageRepo::list_recent(&conn, &lease_id, 20).unwrap();
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].body, "m5");
        assert_eq!(recent[19].body, "m24");
        assert_eq!(recent[0].direction, MessageDirection::Inbound);
    }
}
