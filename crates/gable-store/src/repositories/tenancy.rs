//! Tenant / lease / unit repositories.
//!
//! These collections are owned by the dashboard CRUD layer; the agent only
//! reads them. The inserts here exist for seeding and tests.

use gable_core::domain::{Jurisdiction, Lease, LeaseStatus, Tenant, Unit};
use gable_core::ids::{LeaseId, TenantId, UnitId};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sql::{parse_date, parse_date_opt, parse_enum};

/// Tenant repository.
pub struct TenantRepo;

impl TenantRepo {
    /// Insert a tenant.
    pub fn insert(conn: &Connection, tenant: &Tenant) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO tenants (id, full_name, messaging_address, lease_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tenant.id.as_str(),
                tenant.full_name,
                tenant.messaging_address,
                tenant.lease_id.as_str()
            ],
        )?;
        Ok(())
    }

    /// All tenants registered under a messaging address. The aggregator
    /// requires exactly one; returning the full set lets it distinguish
    /// "unknown" from "ambiguous".
    pub fn find_by_messaging_address(conn: &Connection, address: &str) -> Result<Vec<Tenant>> {
        let mut stmt = conn.prepare(
            "SELECT id, full_name, messaging_address, lease_id
             FROM tenants WHERE messaging_address = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![address], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Get tenant by ID.
    pub fn get_by_id(conn: &Connection, id: &TenantId) -> Result<Option<Tenant>> {
        let row = conn
            .query_row(
                "SELECT id, full_name, messaging_address, lease_id FROM tenants WHERE id = ?1",
                params![id.as_str()],
                Self::from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tenant> {
        Ok(Tenant {
            id: TenantId::from_string(row.get::<_, String>(0)?),
            full_name: row.get(1)?,
            messaging_address: row.get(2)?,
            lease_id: LeaseId::from_string(row.get::<_, String>(3)?),
        })
    }
}

/// Lease repository.
pub struct LeaseRepo;

impl LeaseRepo {
    /// Insert a lease.
    pub fn insert(conn: &Connection, lease: &Lease) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO leases (id, unit_id, tenant_id, start_date, end_date, monthly_rent_pence, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                lease.id.as_str(),
                lease.unit_id.as_str(),
                lease.tenant_id.as_str(),
                lease.start_date.to_string(),
                lease.end_date.map(|d| d.to_string()),
                lease.monthly_rent_pence,
                lease.status.as_str()
            ],
        )?;
        Ok(())
    }

    /// Get lease by ID.
    pub fn get_by_id(conn: &Connection, id: &LeaseId) -> Result<Option<Lease>> {
        let row = conn
            .query_row(
                "SELECT id, unit_id, tenant_id, start_date, end_date, monthly_rent_pence, status
                 FROM leases WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Lease {
                        id: LeaseId::from_string(row.get::<_, String>(0)?),
                        unit_id: UnitId::from_string(row.get::<_, String>(1)?),
                        tenant_id: TenantId::from_string(row.get::<_, String>(2)?),
                        start_date: parse_date(3, &row.get::<_, String>(3)?)?,
                        end_date: parse_date_opt(4, row.get::<_, Option<String>>(4)?.as_deref())?,
                        monthly_rent_pence: row.get(5)?,
                        status: parse_enum(6, &row.get::<_, String>(6)?, LeaseStatus::parse)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

/// Unit repository.
pub struct UnitRepo;

impl UnitRepo {
    /// Insert a unit.
    pub fn insert(conn: &Connection, unit: &Unit) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO units (id, landlord_id, address_line1, address_line2, city, postcode, jurisdiction)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                unit.id.as_str(),
                unit.landlord_id,
                unit.address_line1,
                unit.address_line2,
                unit.city,
                unit.postcode,
                unit.jurisdiction.as_str()
            ],
        )?;
        Ok(())
    }

    /// Get unit by ID.
    pub fn get_by_id(conn: &Connection, id: &UnitId) -> Result<Option<Unit>> {
        let row = conn
            .query_row(
                "SELECT id, landlord_id, address_line1, address_line2, city, postcode, jurisdiction
                 FROM units WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Unit {
                        id: UnitId::from_string(row.get::<_, String>(0)?),
                        landlord_id: row.get(1)?,
                        address_line1: row.get(2)?,
                        address_line2: row.get(3)?,
                        city: row.get(4)?,
                        postcode: row.get(5)?,
                        jurisdiction: parse_enum(6, &row.get::<_, String>(6)?, Jurisdiction::parse)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

#[cfg(test)]
#[allow(unused_results)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    /// Seed a full tenant → lease → unit chain and return the IDs.
    pub(crate) fn seed_tenancy(conn: &Connection, address: &str) -> (TenantId, LeaseId, UnitId) {
        let tenant_id = TenantId::generate();
        let lease_id = LeaseId::generate();
        let unit_id = UnitId::generate();
        UnitRepo::insert(
            conn,
            &Unit {
                id: unit_id.clone(),
                landlord_id: "ll_1".into(),
                address_line1: "12 Harbour Street".into(),
                address_line2: None,
                city: "Bristol".into(),
                postcode: "BS1 4QA".into(),
                jurisdiction: Jurisdiction::EnglandWales,
            },
        )
        .unwrap();
        LeaseRepo::insert(
            conn,
            &Lease {
                id: lease_id.clone(),
                unit_id: unit_id.clone(),
                tenant_id: tenant_id.clone(),
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: None,
                monthly_rent_pence: 120_000,
                status: LeaseStatus::Active,
            },
        )
        .unwrap();
        TenantRepo::insert(
            conn,
            &Tenant {
                id: tenant_id.clone(),
                full_name: "Jordan Miles".into(),
                messaging_address: address.into(),
                lease_id: lease_id.clone(),
            },
        )
        .unwrap();
        (tenant_id, lease_id, unit_id)
    }

    #[test]
    fn find_by_messaging_address() {
        let conn = setup();
        let (tenant_id, ..) = seed_tenancy(&conn, "+447700900001");
        let found = TenantRepo::find_by_messaging_address(&conn, "+447700900001").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tenant_id);

        let none = TenantRepo::find_by_messaging_address(&conn, "+440000000000").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn lease_round_trips() {
        let conn = setup();
        let (_, lease_id, unit_id) = seed_tenancy(&conn, "+447700900002");
        let lease = LeaseRepo::get_by_id(&conn, &lease_id).unwrap().unwrap();
        assert_eq!(lease.unit_id, unit_id);
        assert_eq!(lease.status, LeaseStatus::Active);
        assert_eq!(lease.end_date, None);
        assert_eq!(lease.monthly_rent_pence, 120_000);
    }

    #[test]
    fn unit_round_trips_jurisdiction() {
        let conn = setup();
        let (.., unit_id) = seed_tenancy(&conn, "+447700900003");
        let unit = UnitRepo::get_by_id(&conn, &unit_id).unwrap().unwrap();
        assert_eq!(unit.jurisdiction, Jurisdiction::EnglandWales);
    }

    #[test]
    fn missing_lease_is_none() {
        let conn = setup();
        let missing = LeaseRepo::get_by_id(&conn, &LeaseId::from_string("ls_missing")).unwrap();
        assert!(missing.is_none());
    }
}
