//! Store error type.

use thiserror::Error;

/// Convenience alias used across the repositories.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool exhausted or broken.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON column could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template with the same (jurisdiction, notice type, version)
    /// already exists. Duplicate versions are an invariant violation
    /// rejected at write time, not resolved at read time.
    #[error("duplicate template version {version} for ({jurisdiction}, {notice_type})")]
    DuplicateTemplateVersion {
        /// Jurisdiction text form.
        jurisdiction: String,
        /// Notice type text form.
        notice_type: String,
        /// Conflicting version number.
        version: i64,
    },

    /// A second active payment plan was inserted for a lease that already
    /// has one.
    #[error("lease {lease_id} already has an active payment plan")]
    ActivePlanExists {
        /// The lease in question.
        lease_id: String,
    },
}
