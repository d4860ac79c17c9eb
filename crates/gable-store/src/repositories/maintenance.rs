//! Maintenance request repository.

use chrono::Utc;
use gable_core::domain::{MaintenanceCategory, MaintenanceRequest, MaintenanceStatus, Urgency};
use gable_core::ids::{LeaseId, MaintenanceId};
use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::sql::{parse_enum, parse_timestamp};

/// Options for creating a maintenance request.
pub struct CreateMaintenanceOptions<'a> {
    /// Owning lease.
    pub lease_id: &'a LeaseId,
    /// Category.
    pub category: MaintenanceCategory,
    /// Urgency.
    pub urgency: Urgency,
    /// Free-text description.
    pub description: &'a str,
}

/// Maintenance request repository.
pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Create a request in `open` status. A single atomic statement.
    pub fn create(conn: &Connection, opts: &CreateMaintenanceOptions<'_>) -> Result<MaintenanceRequest> {
        let request = MaintenanceRequest {
            id: MaintenanceId::generate(),
            lease_id: opts.lease_id.clone(),
            category: opts.category,
            urgency: opts.urgency,
            description: opts.description.to_owned(),
            status: MaintenanceStatus::Open,
            created_at: Utc::now(),
        };
        let _ = conn.execute(
            "INSERT INTO maintenance_requests (id, lease_id, category, urgency, description, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                request.id.as_str(),
                request.lease_id.as_str(),
                request.category.as_str(),
                request.urgency.as_str(),
                request.description,
                request.status.as_str(),
                request.created_at.to_rfc3339()
            ],
        )?;
        Ok(request)
    }

    /// Requests not yet completed, newest first.
    pub fn list_open(conn: &Connection, lease_id: &LeaseId) -> Result<Vec<MaintenanceRequest>> {
        let mut stmt = conn.prepare(
            "SELECT id, lease_id, category, urgency, description, status, created_at
             FROM maintenance_requests
             WHERE lease_id = ?1 AND status != 'completed'
             ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![lease_id.as_str()], |row| {
                Ok(MaintenanceRequest {
                    id: MaintenanceId::from_string(row.get::<_, String>(0)?),
                    lease_id: LeaseId::from_string(row.get::<_, String>(1)?),
                    category: parse_enum(2, &row.get::<_, String>(2)?, MaintenanceCategory::parse)?,
                    urgency: parse_enum(3, &row.get::<_, String>(3)?, Urgency::parse)?,
                    description: row.get(4)?,
                    status: parse_enum(5, &row.get::<_, String>(5)?, MaintenanceStatus::parse)?,
                    created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::repositories::tenancy::tests::{seed_tenancy, setup};

    #[test]
    fn created_request_is_open() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900020");
        let request = MaintenanceRepo::create(
            &conn,
            &CreateMaintenanceOptions {
                lease_id: &lease_id,
                category: MaintenanceCategory::Heating,
                urgency: Urgency::Emergency,
                description: "No hot water since yesterday",
            },
        )
        .unwrap();
        assert!(request.id.as_str().starts_with("mr_"));
        assert_eq!(request.status, MaintenanceStatus::Open);

        let open = MaintenanceRepo::list_open(&conn, &lease_id).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].category, MaintenanceCategory::Heating);
    }

    #[test]
    fn completed_requests_excluded_from_open() {
        let conn = setup();
        let (_, lease_id, _) = seed_tenancy(&conn, "+447700900021");
        let request = MaintenanceRepo::create(
            &conn,
            &CreateMaintenanceOptions {
                lease_id: &lease_id,
                category: MaintenanceCategory::Plumbing,
                urgency: Urgency::Routine,
                description: "Dripping tap",
            },
        )
        .unwrap();
        conn.execute(
            "UPDATE maintenance_requests SET status = 'completed' WHERE id = ?1",
            params![request.id.as_str()],
        )
        .unwrap();
        assert!(MaintenanceRepo::list_open(&conn, &lease_id).unwrap().is_empty());
    }
}
