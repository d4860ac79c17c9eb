//! Versioned notice template repository.

use gable_core::domain::{Jurisdiction, NoticeType};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::{Result, StoreError};
use crate::sql::parse_enum;

/// A stored notice template version.
#[derive(Clone, Debug, PartialEq)]
pub struct NoticeTemplateRow {
    /// Jurisdiction the template is written for.
    pub jurisdiction: Jurisdiction,
    /// Notice type.
    pub notice_type: NoticeType,
    /// Version number; higher wins at resolution.
    pub version: i64,
    /// Template body with `{placeholder}` tokens.
    pub body: String,
}

/// Template repository.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a template version. A duplicate (jurisdiction, notice type,
    /// version) is an invariant violation and is rejected here, at write
    /// time.
    pub fn insert(conn: &Connection, template: &NoticeTemplateRow) -> Result<()> {
        let inserted = conn.execute(
            "INSERT INTO notice_templates (jurisdiction, notice_type, version, body)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                template.jurisdiction.as_str(),
                template.notice_type.as_str(),
                template.version,
                template.body
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateTemplateVersion {
                    jurisdiction: template.jurisdiction.to_string(),
                    notice_type: template.notice_type.to_string(),
                    version: template.version,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the newest stored version for (jurisdiction, notice type).
    pub fn resolve_latest(
        conn: &Connection,
        jurisdiction: Jurisdiction,
        notice_type: NoticeType,
    ) -> Result<Option<NoticeTemplateRow>> {
        let row = conn
            .query_row(
                "SELECT jurisdiction, notice_type, version, body FROM notice_templates
                 WHERE jurisdiction = ?1 AND notice_type = ?2
                 ORDER BY version DESC LIMIT 1",
                params![jurisdiction.as_str(), notice_type.as_str()],
                |row| {
                    Ok(NoticeTemplateRow {
                        jurisdiction: parse_enum(0, &row.get::<_, String>(0)?, Jurisdiction::parse)?,
                        notice_type: parse_enum(1, &row.get::<_, String>(1)?, NoticeType::parse)?,
                        version: row.get(2)?,
                        body: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}
