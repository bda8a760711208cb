// crates/compliance-gate-core/tests/compliance_pipeline.rs
// ============================================================================
// Module: Compliance Pipeline Tests
// Description: End-to-end extraction, validation, and check building.
// Purpose: Exercise the full (policy, setting) pipeline against realistic documents.
// Dependencies: compliance-gate-core, serde_json
// ============================================================================

//! End-to-end pipeline behavior over catalog-tree, custom-profile, and
//! classic documents, including the delete-then-reinsert idempotence and
//! first-match-wins determinism guarantees.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Mutex;

use compliance_gate_core::CheckBuilder;
use compliance_gate_core::CheckStore;
use compliance_gate_core::ComplianceCheck;
use compliance_gate_core::ExtractionStrategy;
use compliance_gate_core::Policy;
use compliance_gate_core::PolicyId;
use compliance_gate_core::PolicyMatcher;
use compliance_gate_core::PolicySource;
use compliance_gate_core::SettingDefinition;
use compliance_gate_core::SettingId;
use compliance_gate_core::StoreError;
use compliance_gate_core::TemplateFamily;
use compliance_gate_core::TemplateId;
use compliance_gate_core::Timestamp;
use compliance_gate_core::ValidationOperator;
use compliance_gate_core::ValueKind;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// In-memory check store for pipeline tests.
#[derive(Default)]
struct MemoryStore {
    /// Stored rows across all policies.
    rows: Mutex<Vec<ComplianceCheck>>,
}

impl CheckStore for MemoryStore {
    fn replace_checks(
        &self,
        policy_id: PolicyId,
        checks: &[ComplianceCheck],
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Store("lock".into()))?;
        rows.retain(|row| row.policy_id != policy_id);
        rows.extend_from_slice(checks);
        Ok(())
    }

    fn list_checks(&self, policy_id: PolicyId) -> Result<Vec<ComplianceCheck>, StoreError> {
        let rows = self.rows.lock().map_err(|_| StoreError::Store("lock".into()))?;
        let mut matching: Vec<ComplianceCheck> =
            rows.iter().filter(|row| row.policy_id == policy_id).cloned().collect();
        matching.sort_by_key(|row| row.setting_id);
        Ok(matching)
    }
}

/// Builds an active setting definition bound to the given template.
fn catalog_setting(
    raw_id: u64,
    setting_name: &str,
    setting_path: Option<&str>,
    expected: &str,
    operator: ValidationOperator,
    value_kind: ValueKind,
    template: &str,
) -> SettingDefinition {
    SettingDefinition {
        id: SettingId::from_raw(raw_id).unwrap(),
        display_name: setting_name.to_string(),
        description: None,
        setting_name: setting_name.to_string(),
        setting_path: setting_path.map(str::to_string),
        aliases: Vec::new(),
        expected_value: expected.to_string(),
        operator,
        value_kind,
        template_id: TemplateId::new(template),
        family: TemplateFamily::Configuration,
        platform: None,
        is_active: true,
    }
}

/// Builds a synced policy carrying the given raw document.
fn policy(raw_id: u64, template: &str, document: String) -> Policy {
    Policy {
        id: PolicyId::from_raw(raw_id).unwrap(),
        display_name: "pipeline policy".to_string(),
        template_id: TemplateId::new(template),
        family: TemplateFamily::Configuration,
        source: PolicySource::Synced,
        platform: None,
        document,
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

#[test]
fn catalog_tree_scenario_produces_a_compliant_check() {
    let store = MemoryStore::default();
    let settings = vec![catalog_setting(
        1,
        "bitlocker_requiredeviceencryption",
        None,
        "true",
        ValidationOperator::Equals,
        ValueKind::Boolean,
        "settings-catalog",
    )];
    let document = json!({
        "settings": [{
            "settingInstance": {
                "settingDefinitionId": "bitlocker_requiredeviceencryption",
                "simpleSettingValue": {"value": true}
            }
        }]
    })
    .to_string();
    let builder = CheckBuilder::new(&store, &settings, Timestamp::from_unix_millis(42));
    let outcome = builder.rebuild_policy(&policy(1, "settings-catalog", document));

    assert_eq!(outcome.checks_written, 1);
    let rows = store.list_checks(PolicyId::from_raw(1).unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].actual_value, "true");
    assert!(rows[0].is_compliant);
}

#[test]
fn absent_definition_produces_no_row() {
    let store = MemoryStore::default();
    let settings = vec![catalog_setting(
        1,
        "bitlocker_requiredeviceencryption",
        None,
        "true",
        ValidationOperator::Equals,
        ValueKind::Boolean,
        "settings-catalog",
    )];
    let document = json!({
        "settings": [{
            "settingInstance": {
                "settingDefinitionId": "firewall_enablefirewall",
                "simpleSettingValue": {"value": true}
            }
        }]
    })
    .to_string();
    let builder = CheckBuilder::new(&store, &settings, Timestamp::from_unix_millis(42));
    let outcome = builder.rebuild_policy(&policy(1, "settings-catalog", document));

    assert_eq!(outcome.checks_written, 0);
    assert!(outcome.skipped.is_none());
    assert!(store.list_checks(PolicyId::from_raw(1).unwrap()).unwrap().is_empty());
}

#[test]
fn custom_profile_less_than_scenario_is_compliant() {
    let store = MemoryStore::default();
    let settings = vec![catalog_setting(
        1,
        "maxInactivityTimeDeviceLock",
        Some("DeviceLock/MaxInactivityTimeDeviceLock"),
        "30",
        ValidationOperator::LessThan,
        ValueKind::Number,
        "custom-profile",
    )];
    let document = json!({
        "omaSettings": [{
            "omaUri": "./Device/Vendor/MSFT/Policy/Config/DeviceLock/MaxInactivityTimeDeviceLock",
            "value": 15
        }]
    })
    .to_string();
    let builder = CheckBuilder::new(&store, &settings, Timestamp::from_unix_millis(42));
    let outcome = builder.rebuild_policy(&policy(1, "custom-profile", document));

    assert_eq!(outcome.compliant, 1);
    let rows = store.list_checks(PolicyId::from_raw(1).unwrap()).unwrap();
    assert_eq!(rows[0].actual_value, "15");
    assert!(rows[0].is_compliant);
}

#[test]
fn first_match_wins_prefers_the_catalog_tree_extractor() {
    let definition = catalog_setting(
        1,
        "bitlocker_requiredeviceencryption",
        None,
        "true",
        ValidationOperator::Equals,
        ValueKind::Boolean,
        "settings-catalog",
    );
    // Both the tree and the flat bag could resolve the name; the tree's
    // answer must win, never the stale legacy field.
    let payload = json!({
        "bitlocker_requiredeviceencryption": false,
        "settings": [{
            "settingInstance": {
                "settingDefinitionId": "bitlocker_requiredeviceencryption",
                "simpleSettingValue": {"value": true}
            }
        }]
    })
    .to_string();
    let matcher = PolicyMatcher::new(&payload).unwrap();
    let result = matcher.extract(&definition).unwrap();
    assert_eq!(result.strategy, ExtractionStrategy::CatalogTree);
    assert_eq!(result.value, json!(true));
}

#[test]
fn rebuild_replaces_rows_wholesale() {
    let store = MemoryStore::default();
    let settings = vec![
        catalog_setting(
            1,
            "bitlocker_requiredeviceencryption",
            None,
            "true",
            ValidationOperator::Equals,
            ValueKind::Boolean,
            "settings-catalog",
        ),
        catalog_setting(
            2,
            "firewall_enablefirewall",
            None,
            "true",
            ValidationOperator::Equals,
            ValueKind::Boolean,
            "settings-catalog",
        ),
    ];
    let wide_document = json!({
        "settings": [
            {"settingInstance": {
                "settingDefinitionId": "bitlocker_requiredeviceencryption",
                "simpleSettingValue": {"value": true}
            }},
            {"settingInstance": {
                "settingDefinitionId": "firewall_enablefirewall",
                "simpleSettingValue": {"value": true}
            }}
        ]
    })
    .to_string();
    let narrow_document = json!({
        "settings": [
            {"settingInstance": {
                "settingDefinitionId": "bitlocker_requiredeviceencryption",
                "simpleSettingValue": {"value": true}
            }}
        ]
    })
    .to_string();

    let builder = CheckBuilder::new(&store, &settings, Timestamp::from_unix_millis(42));
    let policy_id = PolicyId::from_raw(1).unwrap();
    let first = builder.rebuild_policy(&policy(1, "settings-catalog", wide_document));
    assert_eq!(first.checks_written, 2);

    // The re-synced document dropped the firewall node; its row must not
    // survive the rebuild.
    let second = builder.rebuild_policy(&policy(1, "settings-catalog", narrow_document));
    assert_eq!(second.checks_written, 1);
    let rows = store.list_checks(policy_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].setting_id, SettingId::from_raw(1).unwrap());
}

#[test]
fn noncompliant_values_are_recorded_as_noncompliant_rows() {
    let store = MemoryStore::default();
    let settings = vec![catalog_setting(
        1,
        "passwordMinimumLength",
        None,
        "12",
        ValidationOperator::GreaterThan,
        ValueKind::Number,
        "windows10-compliance",
    )];
    let document = json!({"passwordMinimumLength": 8}).to_string();
    let builder = CheckBuilder::new(&store, &settings, Timestamp::from_unix_millis(42));
    let outcome = builder.rebuild_policy(&policy(1, "windows10-compliance", document));

    assert_eq!(outcome.noncompliant, 1);
    let rows = store.list_checks(PolicyId::from_raw(1).unwrap()).unwrap();
    assert_eq!(rows[0].actual_value, "8");
    assert!(!rows[0].is_compliant);
}
