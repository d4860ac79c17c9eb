//! Instruction compilation: snapshot → the system prompt for one turn.
//!
//! Compilation is pure and deterministic; same snapshot in, byte-identical
//! instruction set out. No I/O, no clock reads beyond the snapshot's
//! `today`. Every fact the generative component may state comes from here;
//! nothing about the tenancy, the law, or the permitted actions is left for
//! it to infer.

use std::fmt::Write as _;

use gable_core::escalation::EscalationLevel;
use gable_core::snapshot::TenancyContext;
use gable_core::tools::{
    TOOL_CREATE_MAINTENANCE_REQUEST, TOOL_ISSUE_LEGAL_NOTICE, TOOL_QUERY_PAYMENT_STATUS,
    TOOL_SET_ESCALATION_LEVEL,
};
use gable_notices::generator::format_pence;
use gable_notices::rules::rules_for;

/// Word ceiling stated in the reply guardrails.
const REPLY_WORD_LIMIT: usize = 300;

/// The compiled instruction set for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionSet {
    /// Full system prompt text.
    pub system: String,
}

/// Compile the snapshot into the instruction set.
pub fn compile(snapshot: &TenancyContext) -> InstructionSet {
    let mut s = String::with_capacity(4096);

    s.push_str(
        "You are the tenancy management agent acting for the landlord of the \
         property below. You communicate with the tenant over messaging. You \
         are factual, professional, and fair. You only ever discuss this \
         tenancy.\n",
    );

    push_identity(&mut s, snapshot);
    push_payments(&mut s, snapshot);
    push_maintenance(&mut s, snapshot);
    push_legal(&mut s, snapshot);
    push_dialogue(&mut s, snapshot);
    push_rules_table(&mut s, snapshot);
    push_escalation(&mut s, snapshot.escalation_level);
    push_tools(&mut s);
    push_prohibitions(&mut s);

    InstructionSet { system: s }
}

fn push_identity(s: &mut String, snapshot: &TenancyContext) {
    let lease = &snapshot.lease;
    let _ = writeln!(
        s,
        "\n## Tenancy\nTenant: {}\nProperty: {}\nJurisdiction: {}\nLease: {} ({}), \
         started {}, {}\nMonthly rent: {}\nToday's date: {}",
        snapshot.tenant.full_name,
        snapshot.unit.full_address(),
        snapshot.unit.jurisdiction,
        lease.id,
        lease.status,
        lease.start_date.format("%-d %B %Y"),
        lease.end_date.map_or_else(
            || "periodic (no fixed end date)".to_owned(),
            |d| format!("ends {}", d.format("%-d %B %Y")),
        ),
        format_pence(lease.monthly_rent_pence),
        snapshot.today.format("%-d %B %Y"),
    );
}

fn push_payments(s: &mut String, snapshot: &TenancyContext) {
    let _ = writeln!(
        s,
        "\n## Payments\nTotal arrears: {}",
        format_pence(snapshot.arrears_pence)
    );
    match &snapshot.payment_plan {
        Some(plan) => {
            let _ = writeln!(
                s,
                "Active payment plan: {} per {} installment toward {} arrears.",
                format_pence(plan.installment_pence),
                plan.frequency,
                format_pence(plan.total_arrears_pence),
            );
        }
        None => s.push_str("No active payment plan.\n"),
    }
    if snapshot.payments.is_empty() {
        s.push_str("No payment periods on record.\n");
    } else {
        s.push_str("Recent periods (chronological):\n");
        for p in &snapshot.payments {
            let _ = writeln!(
                s,
                "- due {}: {} due, {} paid, {}",
                p.due_date,
                format_pence(p.amount_due_pence),
                p.amount_paid_pence.map_or_else(|| "nothing".to_owned(), format_pence),
                p.status,
            );
        }
    }
}

fn push_maintenance(s: &mut String, snapshot: &TenancyContext) {
    s.push_str("\n## Maintenance\n");
    if snapshot.maintenance.is_empty() {
        s.push_str("No open maintenance requests.\n");
    } else {
        for m in &snapshot.maintenance {
            let _ = writeln!(
                s,
                "- {} ({}, {}, {}): {}",
                m.id, m.category, m.urgency, m.status, m.description
            );
        }
    }
}

fn push_legal(s: &mut String, snapshot: &TenancyContext) {
    s.push_str("\n## Legal\n");
    if snapshot.legal_actions.is_empty() {
        s.push_str("No open legal actions.\n");
    } else {
        for a in &snapshot.legal_actions {
            let _ = writeln!(
                s,
                "- {} ({}, {}{}): {}",
                a.id,
                a.notice_type,
                a.status,
                a.response_deadline
                    .map_or_else(String::new, |d| format!(", respond by {d}")),
                a.agent_reasoning,
            );
        }
    }
    if snapshot.disputes.is_empty() {
        s.push_str("No open disputes.\n");
    } else {
        for d in &snapshot.disputes {
            let _ = writeln!(s, "- dispute {} ({}, {}): {}", d.id, d.category, d.status, d.description);
        }
    }
}

fn push_dialogue(s: &mut String, snapshot: &TenancyContext) {
    s.push_str("\n## Conversation so far\n");
    if snapshot.summary.is_empty() {
        s.push_str("No prior conversation.\n");
    } else {
        let _ = writeln!(s, "{}", snapshot.summary);
    }
}

fn push_rules_table(s: &mut String, snapshot: &TenancyContext) {
    let jurisdiction = snapshot.unit.jurisdiction;
    let _ = writeln!(
        s,
        "\n## Notice periods ({jurisdiction})\nThese are the exact minimum notice \
         periods. Use them verbatim; never estimate a different figure.",
    );
    for (notice_type, days) in rules_for(jurisdiction) {
        let _ = writeln!(s, "- {notice_type}: {days} days");
    }
}

fn push_escalation(s: &mut String, level: EscalationLevel) {
    let _ = writeln!(
        s,
        "\n## Escalation\nThis tenancy is at escalation level {} ({}).",
        level.as_u8(),
        level.label(),
    );
    let guardrail = match level {
        EscalationLevel::Conversational => {
            "Keep a friendly, conversational tone. Do not use formal written-notice \
             language and do not issue written notices at this level; if the situation \
             warrants formality, escalate first."
        }
        EscalationLevel::FormalWritten => {
            "Use formal written communication. Written notices appropriate to the \
             situation may be issued."
        }
        EscalationLevel::LegalProcess => {
            "A legal process is underway. Be precise about issued notices, deadlines, \
             and consequences already in motion."
        }
        EscalationLevel::PreTribunal => {
            "Pre-tribunal stage. Every consequential action you propose must state \
             that it will be confirmed by a human member of the management team \
             before taking effect."
        }
    };
    let _ = writeln!(s, "{guardrail}");
}

fn push_tools(s: &mut String) {
    let _ = writeln!(
        s,
        "\n## Actions\nYou may take exactly these actions, via tool calls:\n\
         - {TOOL_QUERY_PAYMENT_STATUS}\n\
         - {TOOL_CREATE_MAINTENANCE_REQUEST}\n\
         - {TOOL_ISSUE_LEGAL_NOTICE}\n\
         - {TOOL_SET_ESCALATION_LEVEL}\n\
         Always pass the lease ID shown above. Any other action is outside your \
         authority.",
    );
}

fn push_prohibitions(s: &mut String) {
    let _ = writeln!(
        s,
        "\n## Hard rules\n\
         - Never give legal advice; describe the landlord's process only.\n\
         - Never invent dates, amounts, or deadlines; use only the facts above \
           or tool results from this conversation.\n\
         - Never threaten an action you have not actually taken or cannot take.\n\
         - Never discuss another tenancy, or act on a lease other than this one.\n\
         - Keep replies under {REPLY_WORD_LIMIT} words.",
    );
}
