//! Jurisdiction rules table.
//!
//! Static, versioned mapping of legal region → notice type → minimum
//! notice period. This is data, consulted by the deadline arithmetic and
//! embedded verbatim into the instruction set; it is never inferred by
//! any generative step.

use chrono::NaiveDate;
use gable_core::domain::{Jurisdiction, NoticeType};

/// Rules table revision, recorded in provenance metadata.
pub const RULES_VERSION: u32 = 1;

/// Minimum notice period in days for a (notice type, jurisdiction) pair.
///
/// Every pair has a fixed, table-exact value.
pub fn notice_period_days(notice_type: NoticeType, jurisdiction: Jurisdiction) -> i64 {
    use Jurisdiction::{EnglandWales, NorthernIreland, Scotland};
    use NoticeType::{
        FinalArrearsNotice, FormalNotice, LeaseViolationNotice, NoFaultNotice,
        PaymentDemand, PaymentPlanAgreement, RentArrearsNotice,
    };
    match (notice_type, jurisdiction) {
        (FormalNotice, _) => 14,
        (RentArrearsNotice, Scotland) => 28,
        (RentArrearsNotice, EnglandWales | NorthernIreland) => 14,
        (FinalArrearsNotice, Scotland) => 14,
        (FinalArrearsNotice, EnglandWales | NorthernIreland) => 7,
        (NoFaultNotice, EnglandWales) => 56,
        (NoFaultNotice, Scotland) => 182,
        (NoFaultNotice, NorthernIreland) => 84,
        (PaymentDemand, _) => 7,
        (LeaseViolationNotice, Scotland) => 28,
        (LeaseViolationNotice, EnglandWales | NorthernIreland) => 14,
        (PaymentPlanAgreement, _) => 7,
    }
}

/// Deadline for a notice issued today: `issue_date + notice_period`.
pub fn response_deadline(
    notice_type: NoticeType,
    jurisdiction: Jurisdiction,
    issue_date: NaiveDate,
) -> NaiveDate {
    issue_date + chrono::Days::new(notice_period_days(notice_type, jurisdiction) as u64)
}

/// The full rule block for one jurisdiction, in declaration order. Used by
/// the instruction compiler to embed the exact table.
pub fn rules_for(jurisdiction: Jurisdiction) -> Vec<(NoticeType, i64)> {
    NoticeType::all()
        .iter()
        .map(|nt| (*nt, notice_period_days(*nt, jurisdiction)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The complete expected table. Enumerates every (type, jurisdiction)
    /// pair and asserts the exact offset.
    #[test]
    fn every_pair_has_the_table_exact_offset() {
        use Jurisdiction::{EnglandWales, NorthernIreland, Scotland};
        let expected: &[(NoticeType, i64, i64, i64)] = &[
            // (type, england_wales, scotland, northern_ireland)
            (NoticeType::FormalNotice, 14, 14, 14),
            (NoticeType::RentArrearsNotice, 14, 28, 14),
            (NoticeType::FinalArrearsNotice, 7, 14, 7),
            (NoticeType::NoFaultNotice, 56, 182, 84),
            (NoticeType::PaymentDemand, 7, 7, 7),
            (NoticeType::LeaseViolationNotice, 14, 28, 14),
            (NoticeType::PaymentPlanAgreement, 7, 7, 7),
        ];
        assert_eq!(expected.len(), NoticeType::all().len());
        for (nt, ew, sc, ni) in expected {
            assert_eq!(notice_period_days(*nt, EnglandWales), *ew, "{nt} england_wales");
            assert_eq!(notice_period_days(*nt, Scotland), *sc, "{nt} scotland");
            assert_eq!(notice_period_days(*nt, NorthernIreland), *ni, "{nt} northern_ireland");
        }
    }

    #[test]
    fn deadline_is_issue_date_plus_offset() {
        let issued = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            response_deadline(NoticeType::RentArrearsNotice, Jurisdiction::EnglandWales, issued),
            NaiveDate::from_ymd_opt(2026, 9, 13).unwrap()
        );
        assert_eq!(
            response_deadline(NoticeType::NoFaultNotice, Jurisdiction::Scotland, issued),
            NaiveDate::from_ymd_opt(2027, 2, 28).unwrap()
        );
    }

    #[test]
    fn rules_block_covers_all_notice_types() {
        let block = rules_for(Jurisdiction::Scotland);
        assert_eq!(block.len(), NoticeType::all().len());
        assert!(block.contains(&(NoticeType::RentArrearsNotice, 28)));
    }
}
