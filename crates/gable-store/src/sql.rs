//! Small conversion helpers between SQLite text columns and domain enums.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;

/// Map a text column through an enum `parse`, failing the row conversion
/// on unknown values (these columns are only ever written through the
/// typed enums, so an unknown value means a corrupt row).
pub fn parse_enum<T>(
    idx: usize,
    text: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown enum value: {text}").into(),
        )
    })
}

/// Parse an ISO date column.
pub fn parse_date(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    text.parse().map_err(|e: chrono::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

/// Parse an optional ISO date column.
pub fn parse_date_opt(idx: usize, text: Option<&str>) -> rusqlite::Result<Option<NaiveDate>> {
    text.map(|t| parse_date(idx, t)).transpose()
}

/// Parse an RFC 3339 timestamp column.
pub fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}
