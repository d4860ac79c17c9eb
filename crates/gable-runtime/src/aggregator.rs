//! Context aggregation: messaging address → point-in-time tenancy snapshot.
//!
//! Resolution is fatal-or-nothing: no tenant, broken lease linkage, or an
//! ambiguous address aborts the turn before the generative component sees
//! anything. The data reads after resolution accept weak consistency; a
//! write racing the reads is picked up on the next turn.

use chrono::{NaiveDate, Utc};
use gable_core::errors::CoreError;
use gable_core::snapshot::TenancyContext;
use gable_store::Store;
use gable_store::repositories::conversation::{ConversationRepo, MessageRepo};
use gable_store::repositories::legal::{DisputeRepo, LegalActionRepo};
use gable_store::repositories::maintenance::MaintenanceRepo;
use gable_store::repositories::payments::{PaymentPlanRepo, PaymentRepo};
use gable_store::repositories::tenancy::{LeaseRepo, TenantRepo, UnitRepo};
use tracing::{debug, instrument};

use crate::errors::RuntimeError;

/// Raw dialogue messages included in the snapshot.
const MESSAGE_WINDOW: usize = 20;
/// Payment periods included in the snapshot.
const PAYMENT_WINDOW: usize = 6;

/// Assemble the snapshot for the tenancy reachable at `messaging_address`,
/// dated today.
pub fn aggregate(store: &Store, messaging_address: &str) -> Result<TenancyContext, RuntimeError> {
    aggregate_at(store, messaging_address, Utc::now().date_naive())
}

/// [`aggregate`] with an explicit snapshot date.
#[instrument(skip(store))]
pub fn aggregate_at(
    store: &Store,
    messaging_address: &str,
    today: NaiveDate,
) -> Result<TenancyContext, RuntimeError> {
    let conn = store.conn()?;

    let mut tenants = TenantRepo::find_by_messaging_address(&conn, messaging_address)?;
    let tenant = match tenants.len() {
        1 => tenants.remove(0),
        0 => {
            return Err(CoreError::NotFound {
                entity: "tenant",
                lookup: messaging_address.to_owned(),
            }
            .into());
        }
        n => {
            return Err(CoreError::InvalidAction(format!(
                "messaging address {messaging_address} resolves to {n} tenants"
            ))
            .into());
        }
    };
    let lease = LeaseRepo::get_by_id(&conn, &tenant.lease_id)?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "lease",
            lookup: tenant.lease_id.as_str().to_owned(),
        }
    })?;
    let unit = UnitRepo::get_by_id(&conn, &lease.unit_id)?.ok_or_else(|| CoreError::NotFound {
        entity: "unit",
        lookup: lease.unit_id.as_str().to_owned(),
    })?;

    let messages = MessageRepo::list_recent(&conn, &lease.id, MESSAGE_WINDOW)?;
    let conversation = ConversationRepo::get(&conn, &lease.id)?;
    let (summary, escalation_level) = conversation
        .map(|c| (c.summary, c.open_threads.escalation_level))
        .unwrap_or_default();
    let payments = PaymentRepo::list_recent(&conn, &lease.id, PAYMENT_WINDOW)?;
    let arrears_pence = PaymentRepo::arrears_total(&conn, &lease.id)?;
    let payment_plan = PaymentPlanRepo::active_plan(&conn, &lease.id)?;
    let maintenance = MaintenanceRepo::list_open(&conn, &lease.id)?;
    let legal_actions = LegalActionRepo::list_open(&conn, &lease.id)?;
    let disputes = DisputeRepo::list_open(&conn, &lease.id)?;

    debug!(
        lease_id = %lease.id,
        escalation = escalation_level.as_u8(),
        arrears_pence,
        messages = messages.len(),
        "tenancy snapshot assembled"
    );
    Ok(TenancyContext {
        tenant,
        lease,
        unit,
        messages,
        summary,
        escalation_level,
        payments,
        arrears_pence,
        payment_plan,
        maintenance,
        legal_actions,
        disputes,
        today,
    })
}
