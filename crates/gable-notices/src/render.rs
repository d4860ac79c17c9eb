//! Placeholder substitution and document assembly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gable_core::domain::NoticeType;

use crate::errors::NoticeError;

/// Substitute every `{token}` in `template` from `bindings`.
///
/// Any token without a bound value fails the render; a notice is never
/// emitted with an unfilled placeholder.
pub fn substitute(template: &str, bindings: &BTreeMap<&str, String>) -> Result<String, NoticeError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(NoticeError::UnclosedPlaceholder {
                offset: template.len() - rest.len() + open,
            });
        };
        let token = &after[..close];
        match bindings.get(token) {
            Some(value) => out.push_str(value),
            None => {
                return Err(NoticeError::UnboundPlaceholder {
                    placeholder: token.to_owned(),
                });
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Document title derived from the notice type.
pub fn title_for(notice_type: NoticeType) -> String {
    notice_type.as_str().replace('_', " ").to_uppercase()
}

/// Filename convention: `{notice_type}_{party_name}_{yyyyMMdd}.txt`.
///
/// The party name is lowercased with non-alphanumerics collapsed to
/// underscores so the name is filesystem-safe on every platform.
pub fn filename_for(notice_type: NoticeType, party_name: &str, issue_date: NaiveDate) -> String {
    let mut safe_name = String::with_capacity(party_name.len());
    for c in party_name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            safe_name.push(c);
        } else if !safe_name.ends_with('_') {
            safe_name.push('_');
        }
    }
    let safe_name = safe_name.trim_matches('_').to_owned();
    format!(
        "{}_{}_{}.txt",
        notice_type.as_str(),
        safe_name,
        issue_date.format("%Y%m%d")
    )
}

/// Assemble the final durable document: formal header, derived title, the
/// substituted body, and the fixed autonomous-issuance disclosure footer
/// carrying the unique reference token.
pub fn assemble_document(
    notice_type: NoticeType,
    substituted_body: &str,
    property_address: &str,
    issue_date: NaiveDate,
    reference: &str,
) -> String {
    let title = title_for(notice_type);
    format!(
        "{title}\n\
         {underline}\n\
         Date of issue: {date}\n\
         Property: {property_address}\n\n\
         {substituted_body}\n\n\
         ----\n\
         This notice was generated and issued by an automated tenancy \
         management system acting on behalf of the landlord. If you believe \
         it has been issued in error, contact your landlord or seek \
         independent advice. Reference: {reference}\n",
        underline = "=".repeat(title.len()),
        date = issue_date.format("%-d %B %Y"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn bindings() -> BTreeMap<&'static str, String> {
        let mut b = BTreeMap::new();
        let _ = b.insert("tenant_name", "Jordan Miles".to_owned());
        let _ = b.insert("deadline_date", "13 September 2026".to_owned());
        b
    }

    #[test]
    fn substitutes_bound_tokens() {
        let out = substitute("Dear {tenant_name}, reply by {deadline_date}.", &bindings()).unwrap();
        assert_eq!(out, "Dear Jordan Miles, reply by 13 September 2026.");
    }

    #[test]
    fn unbound_token_fails() {
        let err = substitute("Amount: {arrears_amount}", &bindings()).unwrap_err();
        assert_matches!(
            err,
            NoticeError::UnboundPlaceholder { placeholder } if placeholder == "arrears_amount"
        );
    }

    #[test]
    fn unclosed_brace_fails() {
        let err = substitute("Dear {tenant_name", &bindings()).unwrap_err();
        assert_matches!(err, NoticeError::UnclosedPlaceholder { offset: 5 });
    }

    #[test]
    fn plain_text_passes_through() {
        let out = substitute("No placeholders here.", &bindings()).unwrap();
        assert_eq!(out, "No placeholders here.");
    }

    #[test]
    fn title_is_uppercased_notice_type() {
        assert_eq!(title_for(NoticeType::RentArrearsNotice), "RENT ARREARS NOTICE");
        assert_eq!(title_for(NoticeType::NoFaultNotice), "NO FAULT NOTICE");
    }

    #[test]
    fn filename_convention() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            filename_for(NoticeType::RentArrearsNotice, "Jordan Miles", date),
            "rent_arrears_notice_jordan_miles_20260830.txt"
        );
        // Punctuation collapses; no doubled trailing underscores.
        assert_eq!(
            filename_for(NoticeType::PaymentDemand, "O'Brien, Seán ", date),
            "payment_demand_o_brien_se_n_20260830.txt"
        );
    }

    #[test]
    fn assembled_document_carries_header_and_footer() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let doc = assemble_document(
            NoticeType::PaymentDemand,
            "Pay up.",
            "12 Harbour Street, Bristol, BS1 4QA",
            date,
            "doc_ref123",
        );
        assert!(doc.starts_with("PAYMENT DEMAND\n"));
        assert!(doc.contains("Date of issue: 30 August 2026"));
        assert!(doc.contains("Pay up."));
        assert!(doc.contains("automated tenancy management system"));
        assert!(doc.contains("Reference: doc_ref123"));
    }

    #[test]
    fn assembly_is_deterministic_for_fixed_reference() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let a = assemble_document(NoticeType::FormalNotice, "Body.", "Addr", date, "doc_fixed");
        let b = assemble_document(NoticeType::FormalNotice, "Body.", "Addr", date, "doc_fixed");
        assert_eq!(a, b);
    }

    proptest::proptest! {
        #[test]
        fn filename_is_always_filesystem_safe(name in "[a-z0-9].{0,63}") {
            let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
            let filename = filename_for(NoticeType::FormalNotice, &name, date);
            proptest::prop_assert!(
                filename.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            );
            proptest::prop_assert!(!filename.contains("__"));
            proptest::prop_assert!(filename.ends_with("_20260830.txt"));
        }

        #[test]
        fn brace_free_templates_pass_through(template in "[^{}]{0,128}") {
            let out = substitute(&template, &bindings()).unwrap();
            proptest::prop_assert_eq!(out, template);
        }
    }
}
