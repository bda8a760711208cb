// crates/compliance-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Validation Engine
// Description: Operator evaluation of extracted values against expectations.
// Purpose: Decide whether an actual configured value satisfies the catalog.
// Dependencies: crate::core, bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! The validator compares one extracted value against a setting definition's
//! stored expectation. Scalar operators work on lower-cased stringified
//! forms; ordering operators are decimal-aware and fail closed when either
//! side does not parse as a number. Object-kind settings use structural
//! subset matching: every key present in the expected object must exist in
//! the actual object with an equal value, recursing into nested objects,
//! while array-valued fields require exact ordered equality. Extra keys in
//! the actual value (outside arrays) are ignored. The asymmetry between the
//! object and array rules is inherited behavior and preserved as-is.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::core::catalog::ValidationOperator;
use crate::core::catalog::ValueKind;

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Evaluates an actual value against an expected value and operator.
#[must_use]
pub fn validate(
    actual: &Value,
    expected: &str,
    operator: ValidationOperator,
    kind: ValueKind,
) -> bool {
    if kind == ValueKind::Object {
        return validate_object(actual, expected);
    }

    let actual = stringify(actual);
    match operator {
        ValidationOperator::Equals => actual.to_lowercase() == expected.to_lowercase(),
        ValidationOperator::NotEquals => actual.to_lowercase() != expected.to_lowercase(),
        ValidationOperator::GreaterThan => {
            compare_decimals(&actual, expected).is_some_and(|ordering| ordering.is_gt())
        }
        ValidationOperator::LessThan => {
            compare_decimals(&actual, expected).is_some_and(|ordering| ordering.is_lt())
        }
        ValidationOperator::Contains => {
            actual.to_lowercase().contains(&expected.to_lowercase())
        }
        ValidationOperator::NotContains => {
            !actual.to_lowercase().contains(&expected.to_lowercase())
        }
        ValidationOperator::IsSet => is_set(&actual),
    }
}

/// Renders an extracted value into its comparable string form.
///
/// Strings render bare (no JSON quoting); null renders empty so `isSet`
/// and equality semantics line up with "absence".
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Compares two operands as decimals, failing closed on parse errors.
fn compare_decimals(actual: &str, expected: &str) -> Option<std::cmp::Ordering> {
    let actual = BigDecimal::from_str(actual.trim()).ok()?;
    let expected = BigDecimal::from_str(expected.trim()).ok()?;
    Some(actual.cmp(&expected))
}

/// Returns true when the stringified value represents a present value.
fn is_set(actual: &str) -> bool {
    !actual.is_empty() && actual != "null" && actual != "undefined"
}

// ============================================================================
// SECTION: Object Subset Matching
// ============================================================================

/// Validates an object-kind setting using subset semantics.
///
/// Both sides are coerced to JSON: the expected literal is parsed, and an
/// actual string value opening with `{`/`[` is re-parsed. When the expected
/// literal is not valid JSON the comparison degrades to lower-cased string
/// equality rather than failing the run.
fn validate_object(actual: &Value, expected: &str) -> bool {
    let Ok(expected_value) = serde_json::from_str::<Value>(expected) else {
        return stringify(actual).to_lowercase() == expected.to_lowercase();
    };
    let actual_value = coerce_structured(actual);
    is_subset(&expected_value, &actual_value)
}

/// Re-parses string values that carry embedded JSON documents.
fn coerce_structured(value: &Value) -> Value {
    if let Value::String(text) = value {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<Value>(text) {
                return parsed;
            }
        }
    }
    value.clone()
}

/// Returns true when every expected field is present and equal in `actual`.
///
/// Objects recurse under the same subset rule; arrays require exact ordered
/// equality (extra elements or reordering both fail); scalar leaves compare
/// decimal-aware for numbers and strictly otherwise.
fn is_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            expected_map.iter().all(|(key, expected_field)| {
                actual_map
                    .get(key)
                    .is_some_and(|actual_field| is_subset(expected_field, actual_field))
            })
        }
        // Arrays are deliberately stricter than objects: exact ordered
        // equality, extra elements fail, element order matters.
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            expected_items == actual_items
        }
        _ => leaf_equal(expected, actual),
    }
}

/// Compares leaves: numbers decimal-aware, everything else strictly.
fn leaf_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(expected_num), Value::Number(actual_num)) => {
            match (
                BigDecimal::from_str(&expected_num.to_string()),
                BigDecimal::from_str(&actual_num.to_string()),
            ) {
                (Ok(expected_dec), Ok(actual_dec)) => expected_dec == actual_dec,
                _ => false,
            }
        }
        _ => expected == actual,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use serde_json::json;

    use super::*;

    #[test]
    fn equals_is_case_insensitive() {
        assert!(validate(&json!("True"), "true", ValidationOperator::Equals, ValueKind::Boolean));
        assert!(validate(&json!(true), "TRUE", ValidationOperator::Equals, ValueKind::Boolean));
        assert!(!validate(&json!("false"), "true", ValidationOperator::Equals, ValueKind::Boolean));
    }

    #[test]
    fn ordering_is_decimal_aware_and_fails_closed() {
        assert!(validate(&json!(15), "30", ValidationOperator::LessThan, ValueKind::Number));
        assert!(validate(&json!("15"), "30", ValidationOperator::LessThan, ValueKind::Number));
        assert!(validate(&json!(9.5), "9.25", ValidationOperator::GreaterThan, ValueKind::Number));
        // Non-numeric coercion fails the comparison, both directions.
        assert!(!validate(&json!("abc"), "30", ValidationOperator::LessThan, ValueKind::Number));
        assert!(!validate(&json!(15), "abc", ValidationOperator::GreaterThan, ValueKind::Number));
    }

    #[test]
    fn contains_and_not_contains_are_substring_checks() {
        assert!(validate(
            &json!("XtsAes256"),
            "aes256",
            ValidationOperator::Contains,
            ValueKind::Text
        ));
        assert!(validate(
            &json!("XtsAes128"),
            "aes256",
            ValidationOperator::NotContains,
            ValueKind::Text
        ));
    }

    #[test]
    fn isset_rejects_empty_and_null_renderings() {
        assert!(validate(&json!("anything"), "", ValidationOperator::IsSet, ValueKind::Text));
        assert!(!validate(&json!(""), "", ValidationOperator::IsSet, ValueKind::Text));
        assert!(!validate(&Value::Null, "", ValidationOperator::IsSet, ValueKind::Text));
        assert!(!validate(&json!("null"), "", ValidationOperator::IsSet, ValueKind::Text));
    }

    #[test]
    fn object_subset_ignores_extra_actual_keys() {
        let actual = json!({"a": 1, "b": {"c": 2, "d": 3}, "extra": true});
        let expected = r#"{"a": 1, "b": {"c": 2}}"#;
        assert!(validate(&actual, expected, ValidationOperator::Equals, ValueKind::Object));
    }

    #[test]
    fn object_subset_fails_on_missing_or_unequal_keys() {
        let actual = json!({"a": 1});
        assert!(!validate(
            &actual,
            r#"{"a": 2}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
        assert!(!validate(
            &actual,
            r#"{"missing": 1}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
    }

    #[test]
    fn arrays_require_exact_ordered_equality() {
        let actual = json!({"roles": ["a", "b"]});
        assert!(validate(
            &actual,
            r#"{"roles": ["a", "b"]}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
        // Reordered.
        assert!(!validate(
            &actual,
            r#"{"roles": ["b", "a"]}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
        // Extra element in actual.
        let longer = json!({"roles": ["a", "b", "c"]});
        assert!(!validate(
            &longer,
            r#"{"roles": ["a", "b"]}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
    }

    #[test]
    fn string_carrying_json_is_reparsed_for_object_kind() {
        let actual = json!(r#"{"a": 1, "extra": 2}"#);
        assert!(validate(
            &actual,
            r#"{"a": 1}"#,
            ValidationOperator::Equals,
            ValueKind::Object
        ));
    }

    #[test]
    fn invalid_expected_object_degrades_to_string_equality() {
        assert!(validate(
            &json!("not json"),
            "not json",
            ValidationOperator::Equals,
            ValueKind::Object
        ));
    }
}
