//! Schema migrations.
//!
//! Versioned via `PRAGMA user_version`; each entry in [`MIGRATIONS`] runs
//! once, in order, inside a transaction.

use rusqlite::Connection;
use tracing::info;

use crate::errors::Result;

/// Ordered migration steps. Append only; never edit a shipped step.
const MIGRATIONS: &[&str] = &[
    // 1: initial schema
    "
    CREATE TABLE tenants (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        messaging_address TEXT NOT NULL,
        lease_id TEXT NOT NULL
    );
    CREATE INDEX tenants_messaging_address ON tenants(messaging_address);

    CREATE TABLE leases (
        id TEXT PRIMARY KEY,
        unit_id TEXT NOT NULL,
        tenant_id TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT,
        monthly_rent_pence INTEGER NOT NULL,
        status TEXT NOT NULL
    );

    CREATE TABLE units (
        id TEXT PRIMARY KEY,
        landlord_id TEXT NOT NULL,
        address_line1 TEXT NOT NULL,
        address_line2 TEXT,
        city TEXT NOT NULL,
        postcode TEXT NOT NULL,
        jurisdiction TEXT NOT NULL
    );

    CREATE TABLE payments (
        id TEXT PRIMARY KEY,
        lease_id TEXT NOT NULL,
        due_date TEXT NOT NULL,
        amount_due_pence INTEGER NOT NULL,
        amount_paid_pence INTEGER,
        paid_date TEXT,
        status TEXT NOT NULL
    );
    CREATE INDEX payments_lease_due ON payments(lease_id, due_date);

    CREATE TABLE payment_plans (
        id TEXT PRIMARY KEY,
        lease_id TEXT NOT NULL,
        installment_pence INTEGER NOT NULL,
        frequency TEXT NOT NULL,
        total_arrears_pence INTEGER NOT NULL,
        status TEXT NOT NULL
    );
    CREATE UNIQUE INDEX payment_plans_one_active
        ON payment_plans(lease_id) WHERE status = 'active';

    CREATE TABLE maintenance_requests (
        id TEXT PRIMARY KEY,
        lease_id TEXT NOT NULL,
        category TEXT NOT NULL,
        urgency TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX maintenance_requests_lease ON maintenance_requests(lease_id, status);

    CREATE TABLE legal_actions (
        id TEXT PRIMARY KEY,
        lease_id TEXT NOT NULL,
        notice_type TEXT NOT NULL,
        status TEXT NOT NULL,
        issued_at TEXT NOT NULL,
        response_deadline TEXT,
        agent_reasoning TEXT NOT NULL,
        document_ref TEXT
    );
    CREATE INDEX legal_actions_lease ON legal_actions(lease_id, status);

    CREATE TABLE disputes (
        id TEXT PRIMARY KEY,
        lease_id TEXT NOT NULL,
        category TEXT NOT NULL,
        status TEXT NOT NULL,
        description TEXT NOT NULL
    );

    CREATE TABLE conversation_contexts (
        lease_id TEXT PRIMARY KEY,
        summary TEXT NOT NULL DEFAULT '',
        open_threads TEXT NOT NULL DEFAULT '{}',
        updated_at TEXT NOT NULL
    );

    CREATE TABLE messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        lease_id TEXT NOT NULL,
        direction TEXT NOT NULL,
        provider_message_id TEXT,
        reply_to_provider_id TEXT,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX messages_lease_created ON messages(lease_id, created_at);
    CREATE UNIQUE INDEX messages_provider_id
        ON messages(provider_message_id) WHERE provider_message_id IS NOT NULL;

    CREATE TABLE action_log (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        lease_id TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL,
        inputs TEXT NOT NULL,
        outputs TEXT NOT NULL,
        confidence REAL NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX action_log_lease ON action_log(lease_id, seq);

    CREATE TABLE notice_templates (
        jurisdiction TEXT NOT NULL,
        notice_type TEXT NOT NULL,
        version INTEGER NOT NULL,
        body TEXT NOT NULL,
        PRIMARY KEY (jurisdiction, notice_type, version)
    );
    ",
];

/// Run any pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    for (idx, step) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as i64;
        if version <= current {
            continue;
        }
        conn.execute_batch(&format!(
            "BEGIN; {step}; PRAGMA user_version = {version}; COMMIT;"
        ))?;
        info!(version, "applied schema migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_apply_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(version, MIGRATIONS.len() as i64);

        // Idempotent on a second run.
        run_migrations(&conn).unwrap();
        let again: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(again, version);
    }

    #[test]
    fn one_active_plan_index_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let _ = conn
            .execute(
                "INSERT INTO payment_plans VALUES ('pp_1', 'ls_1', 10000, 'monthly', 240000, 'active')",
                [],
            )
            .unwrap();
        let second = conn.execute(
            "INSERT INTO payment_plans VALUES ('pp_2', 'ls_1', 10000, 'monthly', 240000, 'active')",
            [],
        );
        assert!(second.is_err());
        // A completed plan alongside an active one is fine.
        let _ = conn
            .execute(
                "INSERT INTO payment_plans VALUES ('pp_3', 'ls_1', 10000, 'monthly', 240000, 'completed')",
                [],
            )
            .unwrap();
    }
}
