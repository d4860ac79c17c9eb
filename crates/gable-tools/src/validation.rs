//! Input validation helpers shared by the tools.
//!
//! Validation failures come back as error `ToolResult`s (the `Err` side of
//! the inner result) so the generative caller is told what to fix and can
//! retry; they never panic or abort the turn.

use gable_core::tools::{ToolResult, error_result};
use serde_json::Value;

/// Extract a required, non-empty string parameter.
pub fn validate_required_string(
    params: &Value,
    key: &str,
    label: &str,
) -> Result<String, ToolResult> {
    match params.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        Some(_) => Err(error_result(format!("Missing required {label}: '{key}' must not be empty"))),
        None => Err(error_result(format!("Missing required {label}: '{key}'"))),
    }
}

/// Extract a required enum-valued string parameter via `parse`.
pub fn validate_enum<T>(
    params: &Value,
    key: &str,
    label: &str,
    parse: impl Fn(&str) -> Option<T>,
    allowed: &str,
) -> Result<T, ToolResult> {
    let raw = validate_required_string(params, key, label)?;
    parse(&raw).ok_or_else(|| {
        error_result(format!("Invalid {label} '{raw}': must be one of {allowed}"))
    })
}

/// Extract a required integer parameter.
pub fn validate_required_u64(params: &Value, key: &str, label: &str) -> Result<u64, ToolResult> {
    params
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| error_result(format!("Missing required {label}: '{key}' (integer)")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gable_core::domain::Urgency;
    use serde_json::json;

    #[test]
    fn required_string_present() {
        let params = json!({"reason": "  arrears outstanding  "});
        assert_eq!(
            validate_required_string(&params, "reason", "reason").unwrap(),
            "arrears outstanding"
        );
    }

    #[test]
    fn required_string_empty_rejected() {
        let params = json!({"reason": "   "});
        let err = validate_required_string(&params, "reason", "reason").unwrap_err();
        assert_eq!(err.is_error, Some(true));
        assert!(err.content.contains("must not be empty"));
    }

    #[test]
    fn required_string_missing_rejected() {
        let err = validate_required_string(&json!({}), "reason", "reason").unwrap_err();
        assert_eq!(err.is_error, Some(true));
    }

    #[test]
    fn enum_validation() {
        let params = json!({"urgency": "emergency"});
        let urgency = validate_enum(
            &params,
            "urgency",
            "urgency",
            Urgency::parse,
            "emergency, high, routine",
        )
        .unwrap();
        assert_eq!(urgency, Urgency::Emergency);

        let bad = json!({"urgency": "catastrophic"});
        let err = validate_enum(
            &bad,
            "urgency",
            "urgency",
            Urgency::parse,
            "emergency, high, routine",
        )
        .unwrap_err();
        assert!(err.content.contains("catastrophic"));
    }

    #[test]
    fn required_integer() {
        assert_eq!(validate_required_u64(&json!({"new_level": 3}), "new_level", "level").unwrap(), 3);
        assert!(validate_required_u64(&json!({"new_level": "3"}), "new_level", "level").is_err());
    }
}
