//! Escalation ladder and the typed open-threads record.
//!
//! The escalation level is the sole gate on what the agent is allowed to
//! do in a turn. It lives in `ConversationContext.open_threads`, is read at
//! the start of every interaction, and may be rewritten only through the
//! `set_escalation_level` tool call. A missing or malformed stored value
//! always degrades to [`EscalationLevel::Conversational`]: the least
//! consequential level; never to an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::LeaseId;

/// The 4-level escalation ladder for a tenancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EscalationLevel {
    /// Level 1: friendly conversational handling, no written-notice tone.
    Conversational,
    /// Level 2: formal written communication.
    FormalWritten,
    /// Level 3: legal process underway.
    LegalProcess,
    /// Level 4: pre-tribunal; every action surfaced for human sign-off.
    PreTribunal,
}

impl EscalationLevel {
    /// Numeric level, 1–4.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Conversational => 1,
            Self::FormalWritten => 2,
            Self::LegalProcess => 3,
            Self::PreTribunal => 4,
        }
    }

    /// Parse a 1–4 numeric level.
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Conversational),
            2 => Some(Self::FormalWritten),
            3 => Some(Self::LegalProcess),
            4 => Some(Self::PreTribunal),
            _ => None,
        }
    }

    /// Parse a stored JSON value leniently: integers and numeric strings
    /// are accepted; out-of-range or malformed values yield `None`
    /// (callers default to level 1).
    pub fn from_stored(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()).and_then(Self::from_u8),
            Value::String(s) => s.trim().parse::<u8>().ok().and_then(Self::from_u8),
            _ => None,
        }
    }

    /// Human label used in instruction text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::FormalWritten => "formal written",
            Self::LegalProcess => "legal process",
            Self::PreTribunal => "pre-tribunal",
        }
    }
}

impl Default for EscalationLevel {
    fn default() -> Self {
        Self::Conversational
    }
}

impl From<EscalationLevel> for u8 {
    fn from(level: EscalationLevel) -> u8 {
        level.as_u8()
    }
}

impl TryFrom<u8> for EscalationLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_u8(n).ok_or_else(|| format!("escalation level out of range: {n}"))
    }
}

/// Typed open-threads record attached to a conversation context.
///
/// The source system kept this as a free-form map; it is modeled here as an
/// explicit record so the escalation invariant is statically checkable.
/// Extension keys the agent does not interpret ride along in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenThreads {
    /// Current escalation level (1–4).
    pub escalation_level: EscalationLevel,
    /// Uninterpreted extension fields, preserved across rewrites. Flattened
    /// so the stored blob stays the flat map the source system used.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl OpenThreads {
    /// Parse a stored JSON blob leniently. A missing or malformed
    /// `escalation_level` key degrades to level 1; string-valued extension
    /// keys are preserved, everything else is dropped.
    pub fn from_stored(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let escalation_level = map
            .get("escalation_level")
            .and_then(EscalationLevel::from_stored)
            .unwrap_or_default();
        let extra = map
            .iter()
            .filter(|(k, _)| k.as_str() != "escalation_level")
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
            .collect();
        Self {
            escalation_level,
            extra,
        }
    }
}

/// Per-lease rolling conversation state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Owning lease.
    pub lease_id: LeaseId,
    /// Bounded rolling summary of the dialogue.
    pub summary: String,
    /// Typed open-threads record, including the escalation level.
    pub open_threads: OpenThreads,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
