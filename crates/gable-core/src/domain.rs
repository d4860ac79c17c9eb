//! Domain records for one tenancy.
//!
//! These mirror the persistent store's collections. The agent subsystem
//! only reads them, except where a tool call explicitly authorizes a write
//! (a new maintenance request, a new legal action, the escalation level).
//!
//! Status enums store as snake_case text columns; `as_str`/`parse` are the
//! SQLite conversions and match the serde renames exactly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{
    DisputeId, LeaseId, LegalActionId, MaintenanceId, PaymentId, PaymentPlanId, TenantId, UnitId,
};

/// Generates a snake_case text enum with `as_str` and `parse` conversions
/// mirroring the serde renames.
macro_rules! text_enum {
    ($(#[$doc:meta])* $name:ident { $($(#[$vdoc:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vdoc])* $variant),+
        }

        impl $name {
            /// Stable snake_case text form (the SQLite column value).
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse the text form. Returns `None` for unknown values.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// All variants, in declaration order.
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Legal region attached to a unit; selects which notice-period rules
    /// apply. Never inferred; read from the unit record or defaulted.
    Jurisdiction {
        /// England and Wales (the default jurisdiction).
        EnglandWales => "england_wales",
        /// Scotland.
        Scotland => "scotland",
        /// Northern Ireland.
        NorthernIreland => "northern_ireland",
    }
);

impl Default for Jurisdiction {
    fn default() -> Self {
        Self::EnglandWales
    }
}

text_enum!(
    /// Enumerated category of legal document the agent can issue.
    NoticeType {
        /// General formal notice.
        FormalNotice => "formal_notice",
        /// First rent-arrears notice.
        RentArrearsNotice => "rent_arrears_notice",
        /// Final arrears notice before legal process.
        FinalArrearsNotice => "final_arrears_notice",
        /// No-fault end-of-tenancy notice.
        NoFaultNotice => "no_fault_notice",
        /// Demand for immediate payment.
        PaymentDemand => "payment_demand",
        /// Notice of lease violation.
        LeaseViolationNotice => "lease_violation_notice",
        /// Written payment-plan agreement.
        PaymentPlanAgreement => "payment_plan_agreement",
    }
);

text_enum!(
    /// Lease lifecycle status (owned by the excluded CRUD layer).
    LeaseStatus {
        /// In force.
        Active => "active",
        /// Within the end-of-term window.
        Expiring => "expiring",
        /// Past end date.
        Expired => "expired",
        /// Ended early.
        Terminated => "terminated",
    }
);

text_enum!(
    /// Payment record status.
    PaymentStatus {
        /// Fully paid.
        Paid => "paid",
        /// Paid after the due date.
        Late => "late",
        /// Not yet due or unpaid.
        Pending => "pending",
        /// Partially paid.
        Partial => "partial",
    }
);

text_enum!(
    /// Payment plan installment frequency.
    PlanFrequency {
        /// Weekly installments.
        Weekly => "weekly",
        /// Fortnightly installments.
        Fortnightly => "fortnightly",
        /// Monthly installments.
        Monthly => "monthly",
    }
);

text_enum!(
    /// Payment plan status. At most one `Active` plan per lease.
    PlanStatus {
        /// Currently running.
        Active => "active",
        /// All installments paid.
        Completed => "completed",
        /// Installments missed; plan void.
        Broken => "broken",
    }
);

text_enum!(
    /// Maintenance request category.
    MaintenanceCategory {
        /// Water supply, drains, leaks.
        Plumbing => "plumbing",
        /// Wiring, sockets, lighting.
        Electrical => "electrical",
        /// Boiler, radiators, hot water.
        Heating => "heating",
        /// Supplied white goods and fittings.
        Appliance => "appliance",
        /// Walls, roof, windows, doors.
        Structural => "structural",
        /// Damp and mould.
        Damp => "damp",
        /// Pest infestation.
        Pest => "pest",
        /// Locks, alarms, entry systems.
        Security => "security",
        /// Anything else.
        Other => "other",
    }
);

text_enum!(
    /// Maintenance urgency.
    Urgency {
        /// Immediate hazard; same-day response.
        Emergency => "emergency",
        /// Significant impact; days.
        High => "high",
        /// Routine; weeks.
        Routine => "routine",
    }
);

text_enum!(
    /// Maintenance request lifecycle.
    MaintenanceStatus {
        /// Logged, no contractor yet.
        Open => "open",
        /// Contractor assigned.
        Assigned => "assigned",
        /// Work underway.
        InProgress => "in_progress",
        /// Work finished.
        Completed => "completed",
    }
);

text_enum!(
    /// Legal action lifecycle.
    LegalActionStatus {
        /// Notice issued and delivered.
        Issued => "issued",
        /// Tenant acknowledged receipt.
        Acknowledged => "acknowledged",
        /// Tenant complied before the deadline.
        Complied => "complied",
        /// Escalated to the next legal step.
        Escalated => "escalated",
        /// Deadline passed without compliance.
        Expired => "expired",
    }
);

text_enum!(
    /// Dispute lifecycle.
    DisputeStatus {
        /// Raised.
        Open => "open",
        /// Being reviewed.
        UnderReview => "under_review",
        /// Ruling made.
        Ruled => "ruled",
        /// Ruling appealed.
        Appealed => "appealed",
        /// Resolved.
        Closed => "closed",
    }
);

text_enum!(
    /// Direction of a stored dialogue message.
    MessageDirection {
        /// From the tenant to the agent.
        Inbound => "inbound",
        /// From the agent to the tenant.
        Outbound => "outbound",
    }
);

/// A tenant; one per lease for this subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Record ID.
    pub id: TenantId,
    /// Display name, used in notices.
    pub full_name: String,
    /// Messaging channel address (the webhook resolves on this).
    pub messaging_address: String,
    /// The tenant's lease.
    pub lease_id: LeaseId,
}

/// A lease agreement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    /// Record ID.
    pub id: LeaseId,
    /// Unit under lease.
    pub unit_id: UnitId,
    /// Tenant on the lease.
    pub tenant_id: TenantId,
    /// Tenancy start date.
    pub start_date: NaiveDate,
    /// Tenancy end date; `None` = periodic.
    pub end_date: Option<NaiveDate>,
    /// Monthly rent in pence.
    pub monthly_rent_pence: i64,
    /// Lifecycle status.
    pub status: LeaseStatus,
}

/// A rental unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Record ID.
    pub id: UnitId,
    /// Owning landlord reference (managed by the CRUD layer).
    pub landlord_id: String,
    /// First address line.
    pub address_line1: String,
    /// Second address line.
    pub address_line2: Option<String>,
    /// City or town.
    pub city: String,
    /// Postcode.
    pub postcode: String,
    /// Legal region for notice-period rules.
    pub jurisdiction: Jurisdiction,
}

impl Unit {
    /// Single-line postal address for notice rendering.
    pub fn full_address(&self) -> String {
        let mut parts = vec![self.address_line1.as_str()];
        if let Some(line2) = &self.address_line2 {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.postcode);
        parts.join(", ")
    }
}

/// One rent period's payment record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Record ID.
    pub id: PaymentId,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Date the rent fell due.
    pub due_date: NaiveDate,
    /// Amount due in pence.
    pub amount_due_pence: i64,
    /// Amount actually paid, if any.
    pub amount_paid_pence: Option<i64>,
    /// Date paid, if paid.
    pub paid_date: Option<NaiveDate>,
    /// Status.
    pub status: PaymentStatus,
}

impl PaymentRecord {
    /// Unpaid remainder for this period, clamped at zero (an overpayment
    /// never produces negative arrears).
    pub fn outstanding_pence(&self) -> i64 {
        (self.amount_due_pence - self.amount_paid_pence.unwrap_or(0)).max(0)
    }
}

/// Cumulative arrears over a set of payment records.
pub fn arrears_pence(payments: &[PaymentRecord]) -> i64 {
    payments.iter().map(PaymentRecord::outstanding_pence).sum()
}

/// An arrears repayment plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    /// Record ID.
    pub id: PaymentPlanId,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Installment amount in pence.
    pub installment_pence: i64,
    /// Installment frequency.
    pub frequency: PlanFrequency,
    /// Total arrears the plan covers, in pence.
    pub total_arrears_pence: i64,
    /// Status.
    pub status: PlanStatus,
}

/// A maintenance/repair request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    /// Record ID.
    pub id: MaintenanceId,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Category.
    pub category: MaintenanceCategory,
    /// Urgency.
    pub urgency: Urgency,
    /// Free-text description of the problem.
    pub description: String,
    /// Lifecycle status.
    pub status: MaintenanceStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A legal action (an issued notice and its aftermath).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegalAction {
    /// Record ID.
    pub id: LegalActionId,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// The notice type issued.
    pub notice_type: NoticeType,
    /// Lifecycle status.
    pub status: LegalActionStatus,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Deadline for the tenant to respond, if the notice carries one.
    pub response_deadline: Option<NaiveDate>,
    /// Why the agent issued it. Always populated when agent-issued.
    pub agent_reasoning: String,
    /// Reference token of the rendered document artifact.
    pub document_ref: Option<String>,
}

/// A tenancy dispute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// Record ID.
    pub id: DisputeId,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Dispute category (free text, CRUD-owned).
    pub category: String,
    /// Lifecycle status.
    pub status: DisputeStatus,
    /// Description.
    pub description: String,
}

/// One raw dialogue message in the per-lease conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Row ID.
    pub id: i64,
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Direction.
    pub direction: MessageDirection,
    /// Gateway message ID for inbound messages (idempotency key).
    pub provider_message_id: Option<String>,
    /// Message body.
    pub body: String,
    /// Receipt/send timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_round_trip() {
        for j in Jurisdiction::all() {
            assert_eq!(Jurisdiction::parse(j.as_str()), Some(*j));
        }
        for nt in NoticeType::all() {
            assert_eq!(NoticeType::parse(nt.as_str()), Some(*nt));
        }
        for u in Urgency::all() {
            assert_eq!(Urgency::parse(u.as_str()), Some(*u));
        }
    }

    #[test]
    fn unknown_text_parses_to_none() {
        assert_eq!(Jurisdiction::parse("mars"), None);
        assert_eq!(NoticeType::parse(""), None);
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&NoticeType::RentArrearsNotice).unwrap();
        assert_eq!(json, "\"rent_arrears_notice\"");
        let json = serde_json::to_string(&MaintenanceStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn default_jurisdiction_is_england_wales() {
        assert_eq!(Jurisdiction::default(), Jurisdiction::EnglandWales);
    }

    fn payment(due: i64, paid: Option<i64>) -> PaymentRecord {
        PaymentRecord {
            id: PaymentId::generate(),
            lease_id: LeaseId::from_string("ls_test"),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            amount_due_pence: due,
            amount_paid_pence: paid,
            paid_date: None,
            status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn arrears_sums_unpaid_remainders() {
        let payments = vec![
            payment(120_000, None),
            payment(120_000, Some(50_000)),
            payment(120_000, Some(120_000)),
        ];
        assert_eq!(arrears_pence(&payments), 190_000);
    }

    #[test]
    fn overpayment_clamps_to_zero() {
        let payments = vec![payment(120_000, Some(150_000)), payment(120_000, None)];
        assert_eq!(arrears_pence(&payments), 120_000);
    }

    #[test]
    fn full_address_skips_missing_line2() {
        let unit = Unit {
            id: UnitId::from_string("un_1"),
            landlord_id: "ll_1".into(),
            address_line1: "12 Harbour Street".into(),
            address_line2: None,
            city: "Bristol".into(),
            postcode: "BS1 4QA".into(),
            jurisdiction: Jurisdiction::EnglandWales,
        };
        assert_eq!(unit.full_address(), "12 Harbour Street, Bristol, BS1 4QA");
    }
}
