//! Error taxonomy shared across the gable crates.
//!
//! The variants mirror the failure classes of the agent pipeline: snapshot
//! resolution ([`CoreError::NotFound`]), tool validation
//! ([`CoreError::InvalidAction`]), cross-tenancy attempts
//! ([`CoreError::ScopeViolation`]), notice rendering
//! ([`CoreError::TemplateRender`]), and the generative round-trip bound
//! ([`CoreError::Timeout`]).

use thiserror::Error;

/// Shared error taxonomy for the tenancy agent.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A tenancy, lease, or unit could not be resolved. Fatal to the turn:
    /// no action is taken without a resolved tenancy.
    #[error("not found: {entity} ({lookup})")]
    NotFound {
        /// Entity kind that failed to resolve ("tenant", "lease", "unit").
        entity: &'static str,
        /// The lookup key that failed (messaging address, ID).
        lookup: String,
    },

    /// A tool call named a lease other than the one the caller was given
    /// context for. Fatal to the action, logged as a security event, never
    /// silently executed.
    #[error("scope violation: tool call for lease {supplied} inside turn for lease {expected}")]
    ScopeViolation {
        /// Lease the active turn is scoped to.
        expected: String,
        /// Lease the tool call attempted to act on.
        supplied: String,
    },

    /// Malformed or missing required tool input. Surfaced back into the
    /// dialogue loop so the caller can retry with corrected input.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// A notice template could not be fully rendered. Fatal to the notice
    /// issuance only; a notice is never issued with an unfilled
    /// placeholder.
    #[error("template render failed: {0}")]
    TemplateRender(String),

    /// The generative round-trip exceeded its upper bound. The turn fails
    /// soft: no tool calls execute and a generic retry reply is produced.
    #[error("generative round-trip timed out after {0}s")]
    Timeout(u64),
}

impl CoreError {
    /// Whether the error is recoverable within the same turn (the
    /// generative component is told about it and may retry the action).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidAction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_action_is_recoverable() {
        assert!(CoreError::InvalidAction("bad urgency".into()).is_recoverable());
    }

    #[test]
    fn scope_violation_is_not_recoverable() {
        let err = CoreError::ScopeViolation {
            expected: "ls_a".into(),
            supplied: "ls_b".into(),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("ls_b"));
    }

    #[test]
    fn not_found_names_the_lookup() {
        let err = CoreError::NotFound {
            entity: "tenant",
            lookup: "+447700900000".into(),
        };
        assert!(err.to_string().contains("+447700900000"));
    }
}
