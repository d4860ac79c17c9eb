//! Shared test fixtures for the runtime: seeded stores and tenancies.

use chrono::NaiveDate;
use gable_core::domain::{
    Jurisdiction, Lease, LeaseStatus, PaymentRecord, PaymentStatus, Tenant, Unit,
};
use gable_core::ids::{LeaseId, PaymentId, TenantId, UnitId};
use gable_store::Store;
use gable_store::repositories::payments::PaymentRepo;
use gable_store::repositories::tenancy::{LeaseRepo, TenantRepo, UnitRepo};

/// Seed one tenancy reachable at `address`; returns its lease ID.
pub fn seed_tenancy(store: &Store, address: &str) -> LeaseId {
    let conn = store.conn().unwrap();
    let tenant_id = TenantId::generate();
    let lease_id = LeaseId::generate();
    let unit_id = UnitId::generate();

    UnitRepo::insert(
        &conn,
        &Unit {
            id: unit_id.clone(),
            landlord_id: "ll_1".into(),
            address_line1: "4 Mill Lane".into(),
            address_line2: None,
            city: "Leeds".into(),
            postcode: "LS1 2AB".into(),
            jurisdiction: Jurisdiction::EnglandWales,
        },
    )
    .unwrap();
    LeaseRepo::insert(
        &conn,
        &Lease {
            id: lease_id.clone(),
            unit_id,
            tenant_id: tenant_id.clone(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: None,
            monthly_rent_pence: 120_000,
            status: LeaseStatus::Active,
        },
    )
    .unwrap();
    TenantRepo::insert(
        &conn,
        &Tenant {
            id: tenant_id,
            full_name: "Jordan Miles".into(),
            messaging_address: address.into(),
            lease_id: lease_id.clone(),
        },
    )
    .unwrap();
    lease_id
}

/// Add one unpaid rent period of `amount` pence due on `due_date`.
pub fn seed_unpaid_period(store: &Store, lease_id: &LeaseId, due_date: NaiveDate, amount: i64) {
    let conn = store.conn().unwrap();
    PaymentRepo::insert(
        &conn,
        &PaymentRecord {
            id: PaymentId::generate(),
            lease_id: lease_id.clone(),
            due_date,
            amount_due_pence: amount,
            amount_paid_pence: None,
            paid_date: None,
            status: PaymentStatus::Pending,
        },
    )
    .unwrap();
}
