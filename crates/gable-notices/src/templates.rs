//! Notice template resolution.
//!
//! Lookup order: newest stored version for (jurisdiction, notice type),
//! then the built-in fallback for the notice type. The fallback set is
//! fixed and always available, so resolution itself cannot fail.

use gable_core::domain::{Jurisdiction, NoticeType};
use gable_store::repositories::templates::TemplateRepo;
use rusqlite::Connection;
use tracing::debug;

use crate::errors::NoticeError;

/// Where a resolved template came from; recorded as provenance metadata
/// on the issued notice.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TemplateSource {
    /// Stored template at the given version.
    Store {
        /// Version number resolved.
        version: i64,
    },
    /// Built-in fallback for the notice type.
    Fallback,
}

/// A resolved template body plus provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTemplate {
    /// Template body with `{placeholder}` tokens.
    pub body: String,
    /// Provenance.
    pub source: TemplateSource,
}

/// Resolve the template for (jurisdiction, notice type).
pub fn resolve(
    conn: &Connection,
    jurisdiction: Jurisdiction,
    notice_type: NoticeType,
) -> Result<ResolvedTemplate, NoticeError> {
    if let Some(row) = TemplateRepo::resolve_latest(conn, jurisdiction, notice_type)? {
        debug!(%jurisdiction, %notice_type, version = row.version, "resolved stored template");
        return Ok(ResolvedTemplate {
            body: row.body,
            source: TemplateSource::Store { version: row.version },
        });
    }
    debug!(%jurisdiction, %notice_type, "no stored template, using built-in fallback");
    Ok(ResolvedTemplate {
        body: builtin_body(notice_type).to_owned(),
        source: TemplateSource::Fallback,
    })
}

/// The built-in fallback body for a notice type. Always available.
pub fn builtin_body(notice_type: NoticeType) -> &'static str {
    match notice_type {
        NoticeType::FormalNotice => {
            "Dear {tenant_name},\n\n\
             This is a formal notice regarding your tenancy at {property_address}.\n\n\
             {reason}\n\n\
             You are required to respond by {deadline_date} ({notice_period_days} days \
             from the date of this notice).\n\n\
             Lease reference: commenced {lease_start}."
        }
        NoticeType::RentArrearsNotice => {
            "Dear {tenant_name},\n\n\
             Our records show that rent arrears of {arrears_amount} have accrued on your \
             tenancy at {property_address}. Your monthly rent is {rent_amount}.\n\n\
             {reason}\n\n\
             Please pay the outstanding balance, or contact us to discuss a payment plan, \
             by {deadline_date} ({notice_period_days} days from the date of this notice). \
             If the arrears are not addressed, further action may follow under the terms \
             of your lease."
        }
        NoticeType::FinalArrearsNotice => {
            "Dear {tenant_name},\n\n\
             FINAL NOTICE: rent arrears of {arrears_amount} remain outstanding on your \
             tenancy at {property_address} despite previous correspondence.\n\n\
             {reason}\n\n\
             Payment in full is required by {deadline_date} ({notice_period_days} days \
             from the date of this notice). If payment is not received, legal proceedings \
             may be commenced without further warning."
        }
        NoticeType::NoFaultNotice => {
            "Dear {tenant_name},\n\n\
             This notice ends your tenancy of {property_address}, which commenced on \
             {lease_start}.\n\n\
             {reason}\n\n\
             You are required to deliver up vacant possession on or before {deadline_date} \
             ({notice_period_days} days from the date of this notice), in accordance with \
             the notice period applicable in your region."
        }
        NoticeType::PaymentDemand => {
            "Dear {tenant_name},\n\n\
             DEMAND FOR PAYMENT: the sum of {arrears_amount} is due and payable on your \
             tenancy at {property_address}.\n\n\
             {reason}\n\n\
             Payment must be received by {deadline_date} ({notice_period_days} days from \
             the date of this demand)."
        }
        NoticeType::LeaseViolationNotice => {
            "Dear {tenant_name},\n\n\
             A breach of the terms of your lease for {property_address} has been recorded.\n\n\
             {reason}\n\n\
             You are required to remedy the breach by {deadline_date} \
             ({notice_period_days} days from the date of this notice). Failure to do so \
             may result in further action under the terms of your lease."
        }
        NoticeType::PaymentPlanAgreement => {
            "Dear {tenant_name},\n\n\
             This document records the payment plan agreed for your tenancy at \
             {property_address}, covering arrears of {arrears_amount}.\n\n\
             {reason}\n\n\
             The first installment is due by {deadline_date} ({notice_period_days} days \
             from the date of this agreement). Your monthly rent of {rent_amount} remains \
             payable as normal."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gable_store::migrations::run_migrations;
    use gable_store::repositories::templates::NoticeTemplateRow;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn falls_back_when_store_is_empty() {
        let conn = setup();
        let resolved =
            resolve(&conn, Jurisdiction::EnglandWales, NoticeType::RentArrearsNotice).unwrap();
        assert_eq!(resolved.source, TemplateSource::Fallback);
        assert!(resolved.body.contains("{arrears_amount}"));
    }

    #[test]
    fn prefers_newest_stored_version() {
        let conn = setup();
        for version in [1, 2] {
            TemplateRepo::insert(
                &conn,
                &NoticeTemplateRow {
                    jurisdiction: Jurisdiction::EnglandWales,
                    notice_type: NoticeType::RentArrearsNotice,
                    version,
                    body: format!("stored v{version} {{tenant_name}}"),
                },
            )
            .unwrap();
        }
        let resolved =
            resolve(&conn, Jurisdiction::EnglandWales, NoticeType::RentArrearsNotice).unwrap();
        assert_eq!(resolved.source, TemplateSource::Store { version: 2 });
        assert!(resolved.body.starts_with("stored v2"));
    }

    #[test]
    fn stored_template_for_other_jurisdiction_is_ignored() {
        let conn = setup();
        TemplateRepo::insert(
            &conn,
            &NoticeTemplateRow {
                jurisdiction: Jurisdiction::Scotland,
                notice_type: NoticeType::NoFaultNotice,
                version: 1,
                body: "scottish {tenant_name}".into(),
            },
        )
        .unwrap();
        let resolved = resolve(&conn, Jurisdiction::EnglandWales, NoticeType::NoFaultNotice).unwrap();
        assert_eq!(resolved.source, TemplateSource::Fallback);
    }

    #[test]
    fn every_notice_type_has_a_builtin() {
        for nt in NoticeType::all() {
            let body = builtin_body(*nt);
            assert!(body.contains("{tenant_name}"), "{nt} missing tenant_name");
            assert!(body.contains("{deadline_date}"), "{nt} missing deadline_date");
        }
    }
}
