//! Shared test fixtures for tool tests: a seeded in-memory store plus a
//! matching tenancy snapshot.

use std::sync::Arc;

use chrono::NaiveDate;
use gable_core::domain::{
    Jurisdiction, Lease, LeaseStatus, PaymentRecord, PaymentStatus, Tenant, Unit,
};
use gable_core::escalation::EscalationLevel;
use gable_core::ids::{LeaseId, PaymentId, TenantId, UnitId};
use gable_core::snapshot::TenancyContext;
use gable_store::Store;
use gable_store::repositories::payments::PaymentRepo;
use gable_store::repositories::tenancy::{LeaseRepo, TenantRepo, UnitRepo};

use crate::traits::ToolContext;

/// Seed a store with one tenancy (two unpaid months of £1,200 rent) and
/// return it with the matching snapshot.
pub fn seeded() -> (Store, TenancyContext) {
    let store = Store::in_memory().unwrap();
    let conn = store.conn().unwrap();

    let tenant_id = TenantId::generate();
    let lease_id = LeaseId::generate();
    let unit_id = UnitId::generate();

    let unit = Unit {
        id: unit_id.clone(),
        landlord_id: "ll_1".into(),
        address_line1: "12 Harbour Street".into(),
        address_line2: None,
        city: "Bristol".into(),
        postcode: "BS1 4QA".into(),
        jurisdiction: Jurisdiction::EnglandWales,
    };
    let lease = Lease {
        id: lease_id.clone(),
        unit_id: unit_id.clone(),
        tenant_id: tenant_id.clone(),
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        end_date: None,
        monthly_rent_pence: 120_000,
        status: LeaseStatus::Active,
    };
    let tenant = Tenant {
        id: tenant_id,
        full_name: "Jordan Miles".into(),
        messaging_address: "+447700900000".into(),
        lease_id: lease_id.clone(),
    };
    UnitRepo::insert(&conn, &unit).unwrap();
    LeaseRepo::insert(&conn, &lease).unwrap();
    TenantRepo::insert(&conn, &tenant).unwrap();

    let mut payments = Vec::new();
    for month in [6u32, 7] {
        let payment = PaymentRecord {
            id: PaymentId::generate(),
            lease_id: lease_id.clone(),
            due_date: NaiveDate::from_ymd_opt(2026, month, 1).unwrap(),
            amount_due_pence: 120_000,
            amount_paid_pence: None,
            paid_date: None,
            status: PaymentStatus::Pending,
        };
        PaymentRepo::insert(&conn, &payment).unwrap();
        payments.push(payment);
    }

    let snapshot = TenancyContext {
        tenant,
        lease,
        unit,
        messages: vec![],
        summary: String::new(),
        escalation_level: EscalationLevel::Conversational,
        payments,
        arrears_pence: 240_000,
        payment_plan: None,
        maintenance: vec![],
        legal_actions: vec![],
        disputes: vec![],
        today: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
    };
    (store, snapshot)
}

/// Build a `ToolContext` over a snapshot.
pub fn make_ctx(snapshot: &TenancyContext) -> ToolContext {
    ToolContext {
        tool_call_id: "tc_1".into(),
        snapshot: Arc::new(snapshot.clone()),
    }
}
