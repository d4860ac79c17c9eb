//! The bounded, point-in-time tenancy snapshot that grounds one turn.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Dispute, Lease, LegalAction, MaintenanceRequest, PaymentPlan, PaymentRecord, StoredMessage,
    Tenant, Unit,
};
use crate::escalation::EscalationLevel;

/// Everything the agent knows about one tenancy for one turn.
///
/// Assembled by the context aggregator at the start of a turn; all reads
/// reflect approximately the same point in time (partial staleness is
/// corrected on the next turn).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenancyContext {
    /// The tenant.
    pub tenant: Tenant,
    /// Their lease.
    pub lease: Lease,
    /// The leased unit (carries the jurisdiction).
    pub unit: Unit,
    /// Last N raw dialogue messages, chronological.
    pub messages: Vec<StoredMessage>,
    /// Rolling conversation summary.
    pub summary: String,
    /// Current escalation level (defaulted to level 1 when the stored
    /// value was absent or malformed).
    pub escalation_level: EscalationLevel,
    /// Last 6 payment periods, chronological.
    pub payments: Vec<PaymentRecord>,
    /// Cumulative arrears across all periods, in pence.
    pub arrears_pence: i64,
    /// Active payment plan, if any.
    pub payment_plan: Option<PaymentPlan>,
    /// Open maintenance requests.
    pub maintenance: Vec<MaintenanceRequest>,
    /// Open legal actions.
    pub legal_actions: Vec<LegalAction>,
    /// Open disputes.
    pub disputes: Vec<Dispute>,
    /// The snapshot's "today" (all deadline arithmetic keys off this).
    pub today: NaiveDate,
}
