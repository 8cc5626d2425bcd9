//! Checkers for atomic field shapes.
//!
//! Each checker is independent of the others and of the document it is
//! applied to; it receives the value and the path to report against.

use crate::enums::EnumTable;
use crate::error::{ErrorKind, FieldPath, ValidationError};
use crate::shape::display_value;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+-[0-9]{3}$").expect("static regex"));

// ─── Identifier ─────────────────────────────────────────────────────────────

/// Validates a path identifier of the form `service-###`.
///
/// Each way of getting it wrong (empty, wrong number of segments,
/// non-alphanumeric service, wrong digit count) has its own message.
pub fn validate_identifier(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    if IDENTIFIER_RE.is_match(value) {
        return Ok(());
    }
    let violation = |message: String| {
        Err(ValidationError::new(
            path.clone(),
            ErrorKind::FormatViolation,
            message,
        ))
    };

    if value.is_empty() {
        return violation("ID cannot be empty".to_string());
    }
    let parts: Vec<&str> = value.split('-').collect();
    let [service, number] = parts.as_slice() else {
        return violation(format!("ID '{}' must be in format 'service-###'", value));
    };
    if service.is_empty() || !service.chars().all(|c| c.is_ascii_alphanumeric()) {
        return violation(format!(
            "service part of ID '{}' must be alphanumeric",
            value
        ));
    }
    violation(format!(
        "number part of ID '{}' must be exactly 3 digits, got '{}'",
        value, number
    ))
}

// ─── Enum membership ────────────────────────────────────────────────────────

/// Checks that `value` is a string drawn from `table`.
pub fn check_enum(
    table: &EnumTable,
    value: &Value,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    match value.as_str() {
        Some(s) if table.contains(s) => Ok(()),
        _ => Err(ValidationError::new(
            path.clone(),
            ErrorKind::EnumViolation,
            format!(
                "{} '{}' is not valid. Allowed values: {}",
                table.name,
                display_value(value),
                table.allowed()
            ),
        )),
    }
}

// ─── Permission string ──────────────────────────────────────────────────────

/// Checks the `service:Action` shape of an IAM permission.
pub fn validate_permission_string(value: &str, path: &FieldPath) -> Result<(), ValidationError> {
    if value.contains(':') {
        Ok(())
    } else {
        Err(ValidationError::new(
            path.clone(),
            ErrorKind::FormatViolation,
            format!("permission '{}' must be in format 'service:Action'", value),
        ))
    }
}

// ─── Sequential numbering ───────────────────────────────────────────────────

/// Checks that `numbers`, once sorted, are exactly `1..=N`.
///
/// Source order is irrelevant. Any gap, duplicate or out-of-range value is
/// reported as one violation listing the found and expected ranges.
/// `owner` names the sequence (e.g. a tool) in the message.
pub fn check_sequential(
    numbers: &[i64],
    owner: Option<&str>,
    path: &FieldPath,
) -> Result<(), ValidationError> {
    let mut found = numbers.to_vec();
    found.sort_unstable();
    let expected: Vec<i64> = (1..=numbers.len() as i64).collect();
    if found == expected {
        return Ok(());
    }
    let prefix = owner
        .map(|o| format!("tool '{}' ", o))
        .unwrap_or_default();
    Err(ValidationError::new(
        path.clone(),
        ErrorKind::SequenceViolation,
        format!(
            "{}steps must be numbered sequentially starting from 1. Found: {:?}, Expected: {:?}",
            prefix, found, expected
        ),
    ))
}
