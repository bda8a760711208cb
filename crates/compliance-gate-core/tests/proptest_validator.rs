// crates/compliance-gate-core/tests/proptest_validator.rs
// ============================================================================
// Module: Validator Property Tests
// Description: Property-based coverage of object-subset and array laws.
// Purpose: Verify subset matching holds for arbitrary generated objects.
// Dependencies: compliance-gate-core, proptest, serde_json
// ============================================================================

//! Property-based tests for the validation engine's structural laws:
//! expected-keys-subset acceptance regardless of key order, and exact
//! ordered equality for array-valued fields.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use compliance_gate_core::ValidationOperator;
use compliance_gate_core::ValueKind;
use compliance_gate_core::validate;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Generates a scalar JSON leaf.
fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{1,8}".prop_map(Value::String),
    ]
}

/// Generates a flat object of scalar leaves keyed by short names.
fn flat_object() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map("[a-z]{1,6}", leaf(), 0..6).prop_map(|map| {
        let mut object = Map::new();
        for (key, value) in map {
            object.insert(key, value);
        }
        object
    })
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    /// Any object validates against a subset of its own keys, whatever the
    /// serialization order of either side.
    #[test]
    fn expected_subset_of_actual_always_validates(
        base in flat_object(),
        extra in flat_object(),
    ) {
        // Expected = base; actual = base plus extra keys that do not shadow it.
        let mut actual = base.clone();
        for (key, value) in extra {
            actual.entry(key).or_insert(value);
        }
        let expected = serde_json::to_string(&Value::Object(base)).unwrap();
        prop_assert!(validate(
            &Value::Object(actual),
            &expected,
            ValidationOperator::Equals,
            ValueKind::Object,
        ));
    }

    /// A changed value on any expected key fails the subset match.
    #[test]
    fn changed_expected_value_fails(base in flat_object()) {
        prop_assume!(!base.is_empty());
        let victim = base.keys().next().unwrap().clone();
        let mut expected_map = base.clone();
        expected_map.insert(victim, json!("mutated-sentinel-value"));
        let expected = serde_json::to_string(&Value::Object(expected_map)).unwrap();
        prop_assert!(!validate(
            &Value::Object(base),
            &expected,
            ValidationOperator::Equals,
            ValueKind::Object,
        ));
    }

    /// Arrays validate only in their exact original order and length.
    #[test]
    fn arrays_demand_exact_order(items in proptest::collection::vec("[a-z]{1,6}", 2..6)) {
        let actual = json!({"roles": items.clone()});
        let same = serde_json::to_string(&json!({"roles": items.clone()})).unwrap();
        prop_assert!(validate(&actual, &same, ValidationOperator::Equals, ValueKind::Object));

        let mut reversed = items.clone();
        reversed.reverse();
        if reversed != items {
            let flipped = serde_json::to_string(&json!({"roles": reversed})).unwrap();
            prop_assert!(!validate(
                &actual,
                &flipped,
                ValidationOperator::Equals,
                ValueKind::Object,
            ));
        }

        let mut truncated = items.clone();
        truncated.pop();
        let shorter = serde_json::to_string(&json!({"roles": truncated})).unwrap();
        prop_assert!(!validate(&actual, &shorter, ValidationOperator::Equals, ValueKind::Object));
    }
}
