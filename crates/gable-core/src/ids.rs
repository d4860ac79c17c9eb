//! Branded ID newtypes.
//!
//! Every persisted record carries a prefixed UUIDv7 string ID (`ls_…`,
//! `tn_…`). The prefix makes IDs self-describing in logs and the action
//! trail; the newtype keeps a lease ID from being passed where a tenant ID
//! is expected; the scope pre-check in the tool executor depends on that
//! distinction being a compile-time one.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh prefixed UUIDv7 ID.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::now_v7()))
            }

            /// Wrap an existing ID string (e.g. read back from storage).
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The underlying string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

branded_id!(
    /// Tenant record ID (`tn_…`).
    TenantId, "tn");
branded_id!(
    /// Lease record ID (`ls_…`).
    LeaseId, "ls");
branded_id!(
    /// Unit record ID (`un_…`).
    UnitId, "un");
branded_id!(
    /// Payment record ID (`pay_…`).
    PaymentId, "pay");
branded_id!(
    /// Payment plan ID (`pp_…`).
    PaymentPlanId, "pp");
branded_id!(
    /// Maintenance request ID (`mr_…`).
    MaintenanceId, "mr");
branded_id!(
    /// Legal action ID (`la_…`).
    LegalActionId, "la");
branded_id!(
    /// Dispute ID (`dp_…`).
    DisputeId, "dp");
branded_id!(
    /// Action log entry ID (`al_…`).
    ActionLogId, "al");
branded_id!(
    /// Rendered notice document ID (`doc_…`).
    DocumentId, "doc");
