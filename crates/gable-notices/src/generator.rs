//! The notice generation pipeline.
//!
//! resolve template → compute deadline → bind placeholders → substitute →
//! assemble document. Deterministic end to end for a fixed reference token;
//! any failure aborts issuance with nothing persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gable_core::domain::{Jurisdiction, NoticeType};
use gable_core::ids::DocumentId;
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::errors::NoticeError;
use crate::render::{assemble_document, filename_for, substitute};
use crate::rules::{notice_period_days, response_deadline};
use crate::templates::{self, TemplateSource};

/// Facts needed to render one notice, drawn from the tenancy snapshot.
#[derive(Clone, Debug)]
pub struct NoticeRequest {
    /// Notice type to issue.
    pub notice_type: NoticeType,
    /// Jurisdiction of the unit.
    pub jurisdiction: Jurisdiction,
    /// Tenant display name.
    pub tenant_name: String,
    /// Full property address.
    pub property_address: String,
    /// Monthly rent in pence.
    pub monthly_rent_pence: i64,
    /// Current arrears in pence.
    pub arrears_pence: i64,
    /// Lease start date.
    pub lease_start: NaiveDate,
    /// Lease end date; `None` for a periodic tenancy.
    pub lease_end: Option<NaiveDate>,
    /// Free-text reason supplied with the tool call.
    pub reason: String,
    /// Issue date (the snapshot's "today").
    pub issue_date: NaiveDate,
}

/// A fully rendered notice plus provenance metadata.
#[derive(Clone, Debug)]
pub struct IssuedNotice {
    /// Unique reference token embedded in the disclosure footer.
    pub reference: DocumentId,
    /// Notice type.
    pub notice_type: NoticeType,
    /// Deadline computed from the rules table.
    pub response_deadline: NaiveDate,
    /// Conventional artifact filename.
    pub filename: String,
    /// Final document text.
    pub document: String,
    /// Which template produced it (stored version or fallback).
    pub provenance: TemplateSource,
}

/// Legal notice document generator.
pub struct NoticeGenerator;

impl NoticeGenerator {
    /// Generate a notice with a fresh reference token.
    pub fn generate(conn: &Connection, request: &NoticeRequest) -> Result<IssuedNotice, NoticeError> {
        Self::generate_with_reference(conn, request, DocumentId::generate())
    }

    /// Generate with a caller-supplied reference token. Rendering twice
    /// with identical input and the same token is byte-identical.
    #[instrument(skip(conn, request), fields(notice_type = %request.notice_type, jurisdiction = %request.jurisdiction))]
    pub fn generate_with_reference(
        conn: &Connection,
        request: &NoticeRequest,
        reference: DocumentId,
    ) -> Result<IssuedNotice, NoticeError> {
        let template = templates::resolve(conn, request.jurisdiction, request.notice_type)?;
        let deadline =
            response_deadline(request.notice_type, request.jurisdiction, request.issue_date);
        let bindings = Self::bindings(request, deadline);
        let body = substitute(&template.body, &bindings)?;
        let document = assemble_document(
            request.notice_type,
            &body,
            &request.property_address,
            request.issue_date,
            reference.as_str(),
        );
        let filename = filename_for(request.notice_type, &request.tenant_name, request.issue_date);
        info!(
            reference = %reference,
            deadline = %deadline,
            provenance = ?template.source,
            "notice rendered"
        );
        Ok(IssuedNotice {
            reference,
            notice_type: request.notice_type,
            response_deadline: deadline,
            filename,
            document,
            provenance: template.source,
        })
    }

    fn bindings(request: &NoticeRequest, deadline: NaiveDate) -> BTreeMap<&'static str, String> {
        let period = notice_period_days(request.notice_type, request.jurisdiction);
        let mut b = BTreeMap::new();
        let _ = b.insert("tenant_name", request.tenant_name.clone());
        let _ = b.insert("property_address", request.property_address.clone());
        let _ = b.insert("today", request.issue_date.format("%-d %B %Y").to_string());
        let _ = b.insert("rent_amount", format_pence(request.monthly_rent_pence));
        let _ = b.insert("arrears_amount", format_pence(request.arrears_pence));
        let _ = b.insert("deadline_date", deadline.format("%-d %B %Y").to_string());
        let _ = b.insert("notice_period_days", period.to_string());
        let _ = b.insert("reason", request.reason.clone());
        let _ = b.insert("lease_start", request.lease_start.format("%-d %B %Y").to_string());
        let _ = b.insert(
            "lease_end",
            request
                .lease_end
                .map_or_else(|| "periodic tenancy".to_owned(), |d| d.format("%-d %B %Y").to_string()),
        );
        b
    }
}

/// Format pence as a pounds amount, e.g. `£2400.00`.
pub fn format_pence(pence: i64) -> String {
    format!("£{}.{:02}", pence / 100, (pence % 100).abs())
}
