//! Payment record and payment plan repositories.

use gable_core::domain::{
    PaymentPlan, PaymentRecord, PaymentStatus, PlanFrequency, PlanStatus, arrears_pence,
};
use gable_core::ids::{LeaseId, PaymentId, PaymentPlanId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{Result, StoreError};
use crate::sql::{parse_date, parse_date_opt, parse_enum};

/// Payment record repository (read-only from the agent's side).
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a payment record.
    pub fn insert(conn: &Connection, payment: &PaymentRecord) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO payments (id, lease_id, due_date, amount_due_pence, amount_paid_pence, paid_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                payment.id.as_str(),
                payment.lease_id.as_str(),
                payment.due_date.to_string(),
                payment.amount_due_pence,
                payment.amount_paid_pence,
                payment.paid_date.map(|d| d.to_string()),
                payment.status.as_str()
            ],
        )?;
        Ok(())
    }

    /// The most recent `limit` payment periods, returned chronologically.
    pub fn list_recent(conn: &Connection, lease_id: &LeaseId, limit: usize) -> Result<Vec<PaymentRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, due_date, amount_due_pence, amount_paid_pence, paid_date, status
             FROM payments WHERE lease_id = ?1 ORDER BY due_date DESC LIMIT ?2",
        )?;
        let mut rows = stmt
            .query_map(params![lease_id.as_str(), limit as i64], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.reverse();
        Ok(rows)
    }

    /// Cumulative arrears across every payment period of the lease.
    pub fn arrears_total(conn: &Connection, lease_id: &LeaseId) -> Result<i64> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, due_date, amount_due_pence, amount_paid_pence, paid_date, status
             FROM payments WHERE lease_id = ?1 ORDER BY due_date",
        )?;
        let rows = stmt
            .query_map(params![lease_id.as_str()], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(arrears_pence(&rows))
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaymentRecord> {
        Ok(PaymentRecord {
            id: PaymentId::from_string(row.get::<_, String>(0)?),
            lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
            due_date: parse_date(2, &row.get::<_, String>(2)?)?,
            amount_due_pence: row.get(3)?,
            amount_paid_pence: row.get(4)?,
            paid_date: parse_date_opt(5, row.get::<_, Option<String>>(5)?.as_deref())?,
            status: parse_enum(6, &row.get::<_, String>(6)?, PaymentStatus::parse)?,
        })
    }
}

/// Payment plan repository.
pub struct PaymentPlanRepo;

impl PaymentPlanRepo {
    /// Insert a plan. A second active plan for the same lease violates the
    /// one-active-plan invariant and is rejected.
    pub fn insert(conn: &Connection, plan: &PaymentPlan) -> Result<()> {
        let inserted = conn.execute(
            "INSERT INTO payment_plans (id, lease_id, installment_pence, frequency, total_arrears_pence, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                plan.id.as_str(),
                plan.lease_id.as_str(),
                plan.installment_pence,
                plan.frequency.as_str(),
                plan.total_arrears_pence,
                plan.status.as_str()
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
                    && plan.status == PlanStatus::Active =>
            {
                Err(StoreError::ActivePlanExists {
                    lease_id: plan.lease_id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The lease's active plan, if any.
    pub fn active_plan(conn: &Connection, lease_id: &LeaseId) -> Result<Option<PaymentPlan>> {
        let row = conn
            .query_row(
                "SELECT id, lease_id, installment_pence, frequency, total_arrears_pence, status
                 FROM payment_plans WHERE lease_id = ?1 AND status = 'active'",
                params![lease_id.as_str()],
                |row| {
                    Ok(PaymentPlan {
                        id: PaymentPlanId::from_string(row.get::<_, String>(0)?),
                        lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
                        installment_pence: row.get(2)?,
                        frequency: parse_enum(3, &row.get::<_, String>(3)?, PlanFrequency::parse)?,
                        total_arrears_pence: row.get(4)?,
                        status: parse_enum(5, &row.get::<_, String>(5)?, PlanStatus::parse)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}
