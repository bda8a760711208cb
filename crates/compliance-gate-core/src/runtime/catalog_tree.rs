// crates/compliance-gate-core/src/runtime/catalog_tree.rs
// ============================================================================
// Module: Catalog Tree Extractor
// Description: Flattens nested settings-catalog documents into definition-id maps.
// Purpose: Resolve catalogued setting values from tree-structured policies.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Settings-catalog documents represent configuration as an array of
//! definition-id-keyed nodes; choice and group nodes nest child nodes under a
//! parent. The extractor walks the tree once per policy, flattening every
//! node into a lower-cased definition-id map tagged with its parent and
//! depth, then serves per-definition lookups against that map.
//!
//! Leaf values needed for compliance (a cipher strength, a PIN length) are
//! frequently stored as children of a parent toggle whose own value is just
//! enabled/disabled. The extractor does not auto-select "the most specific
//! child": which child matters is setting-specific, so the catalog encodes
//! the child definition id directly in the affected definitions'
//! `setting_name`, and callers target it exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::catalog::SettingDefinition;
use crate::core::checks::ExtractionResult;
use crate::core::checks::ExtractionStrategy;
use crate::core::checks::MatchConfidence;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Known enumerated option-id suffixes and the labels they decode to.
///
/// Choice values are stored as option ids shaped like definition ids
/// (`<definition_id>_<option>`); this table maps the well-known option
/// fragments back to comparable literals.
const OPTION_LABEL_SUFFIXES: [(&str, &str); 10] = [
    ("_true", "true"),
    ("_false", "false"),
    ("_enabled", "enabled"),
    ("_disabled", "disabled"),
    ("_allowed", "allowed"),
    ("_blocked", "blocked"),
    ("_required", "required"),
    ("_notconfigured", "not_configured"),
    ("_1", "enabled"),
    ("_0", "disabled"),
];

// ============================================================================
// SECTION: Flattened Entries
// ============================================================================

/// Kind of value carried by a flattened catalog node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogValueKind {
    /// Enumerated choice value (option-id literal).
    Choice,
    /// Scalar simple value.
    Simple,
    /// Collection of scalar simple values.
    SimpleCollection,
    /// Group node whose value lives on its children.
    Group,
    /// Collection of group nodes.
    GroupCollection,
}

/// One flattened catalog node.
///
/// # Invariants
/// - `parent` names the enclosing definition id for nested nodes.
/// - Group and group-collection nodes carry a null value; their children
///   hold the extractable leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// The node's value (null for group nodes).
    pub value: Value,
    /// Kind of value node.
    pub kind: CatalogValueKind,
    /// Nesting level (0 for top-level nodes).
    pub depth: u32,
    /// Enclosing definition id, when nested.
    pub parent: Option<String>,
}

/// Flattened index over one settings-catalog document.
///
/// # Invariants
/// - Keys are lower-cased definition ids.
/// - Built once per policy; lookups never re-walk the document.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    /// Lower-cased definition id to flattened entry.
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogIndex {
    /// Builds the index by walking the document's top-level settings array.
    #[must_use]
    pub fn from_document(document: &Value) -> Self {
        let mut index = Self::default();
        let Some(settings) = document.get("settings").and_then(Value::as_array) else {
            return index;
        };
        for element in settings {
            if let Some(instance) = element.get("settingInstance") {
                index.walk_instance(instance, 0, None);
            }
        }
        index
    }

    /// Returns the number of flattened entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a flattened entry by lower-cased definition id.
    #[must_use]
    pub fn entry(&self, definition_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(definition_id)
    }

    /// Recursively flattens one setting instance node.
    fn walk_instance(&mut self, instance: &Value, depth: u32, parent: Option<&str>) {
        let Some(definition_id) = instance.get("settingDefinitionId").and_then(Value::as_str)
        else {
            return;
        };
        let definition_id = definition_id.to_lowercase();

        if let Some(choice) = instance.get("choiceSettingValue") {
            let value = choice.get("value").cloned().unwrap_or(Value::Null);
            self.insert(&definition_id, value, CatalogValueKind::Choice, depth, parent);
            self.walk_children(choice.get("children"), depth + 1, &definition_id);
        } else if let Some(simple) = instance.get("simpleSettingValue") {
            let value = simple.get("value").cloned().unwrap_or(Value::Null);
            self.insert(&definition_id, value, CatalogValueKind::Simple, depth, parent);
        } else if let Some(collection) =
            instance.get("simpleSettingCollectionValue").and_then(Value::as_array)
        {
            let values: Vec<Value> =
                collection.iter().filter_map(|item| item.get("value").cloned()).collect();
            self.insert(
                &definition_id,
                Value::Array(values),
                CatalogValueKind::SimpleCollection,
                depth,
                parent,
            );
        } else if let Some(group) = instance.get("groupSettingValue") {
            self.insert(&definition_id, Value::Null, CatalogValueKind::Group, depth, parent);
            self.walk_children(group.get("children"), depth + 1, &definition_id);
        } else if let Some(groups) =
            instance.get("groupSettingCollectionValue").and_then(Value::as_array)
        {
            self.insert(
                &definition_id,
                Value::Null,
                CatalogValueKind::GroupCollection,
                depth,
                parent,
            );
            for group in groups {
                self.walk_children(group.get("children"), depth + 1, &definition_id);
            }
        }
    }

    /// Flattens an optional children array under the given parent.
    fn walk_children(&mut self, children: Option<&Value>, depth: u32, parent: &str) {
        let Some(children) = children.and_then(Value::as_array) else {
            return;
        };
        for child in children {
            self.walk_instance(child, depth, Some(parent));
        }
    }

    /// Inserts a flattened entry, keeping the first occurrence of an id.
    fn insert(
        &mut self,
        definition_id: &str,
        value: Value,
        kind: CatalogValueKind,
        depth: u32,
        parent: Option<&str>,
    ) {
        self.entries.entry(definition_id.to_string()).or_insert(CatalogEntry {
            value,
            kind,
            depth,
            parent: parent.map(str::to_string),
        });
    }

    /// Resolves a setting definition against the flattened index.
    ///
    /// Tries, in order: exact definition-id equality on `setting_name`,
    /// containment either direction against `setting_name`/`setting_path`,
    /// then a decode step for choice literals shaped like definition ids.
    #[must_use]
    pub fn resolve(&self, definition: &SettingDefinition) -> Option<ExtractionResult> {
        let name = definition.setting_name.to_lowercase();

        if let Some(entry) = self.entries.get(&name)
            && !entry.value.is_null()
        {
            return Some(build_result(&name, entry, MatchConfidence::Exact));
        }

        let mut needles = vec![name];
        if let Some(path) = &definition.setting_path {
            let path = path.to_lowercase();
            if !path.is_empty() {
                needles.push(path);
            }
        }
        for (definition_id, entry) in &self.entries {
            if entry.value.is_null() {
                continue;
            }
            let contained = needles.iter().any(|needle| {
                !needle.is_empty()
                    && (definition_id.contains(needle.as_str()) || needle.contains(definition_id))
            });
            if contained {
                return Some(build_result(definition_id, entry, MatchConfidence::Partial));
            }
        }

        None
    }
}

// ============================================================================
// SECTION: Choice Decoding
// ============================================================================

/// Builds an extraction result, decoding choice option-id literals.
fn build_result(
    definition_id: &str,
    entry: &CatalogEntry,
    confidence: MatchConfidence,
) -> ExtractionResult {
    let value = if entry.kind == CatalogValueKind::Choice {
        decode_choice_value(definition_id, &entry.value)
    } else {
        entry.value.clone()
    };
    ExtractionResult {
        value,
        strategy: ExtractionStrategy::CatalogTree,
        confidence,
        provenance: definition_id.to_string(),
    }
}

/// Decodes a choice literal when it is shaped like a definition id.
///
/// Option ids extend their definition id (`<definition_id>_<option>`), so
/// the decode first strips the owning id, then falls back to the known
/// suffix table. Literals that are not id-shaped pass through unchanged.
fn decode_choice_value(definition_id: &str, literal: &Value) -> Value {
    let Some(token) = literal.as_str() else {
        return literal.clone();
    };
    let token = token.to_lowercase();
    if !is_definition_id_shaped(&token) {
        return literal.clone();
    }

    if let Some(option) = token.strip_prefix(definition_id).and_then(|rest| rest.strip_prefix('_'))
    {
        return Value::String(decode_option_fragment(option).to_string());
    }

    for (suffix, label) in OPTION_LABEL_SUFFIXES {
        if token.ends_with(suffix) {
            return Value::String(label.to_string());
        }
    }

    Value::String(token)
}

/// Returns true when a literal looks like a definition-id token.
fn is_definition_id_shaped(token: &str) -> bool {
    token.contains('_') && !token.contains(char::is_whitespace)
}

/// Maps a stripped option fragment to a comparable label.
fn decode_option_fragment(option: &str) -> &str {
    match option {
        "1" => "enabled",
        "0" => "disabled",
        other => other,
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
    use crate::core::catalog::ValidationOperator;
    use crate::core::catalog::ValueKind;
    use crate::core::identifiers::SettingId;
    use crate::core::identifiers::TemplateId;
    use crate::core::policy::TemplateFamily;

    fn definition(setting_name: &str, setting_path: Option<&str>) -> SettingDefinition {
        SettingDefinition {
            id: SettingId::from_raw(1).unwrap(),
            display_name: "Require device encryption".to_string(),
            description: None,
            setting_name: setting_name.to_string(),
            setting_path: setting_path.map(str::to_string),
            aliases: Vec::new(),
            expected_value: "true".to_string(),
            operator: ValidationOperator::Equals,
            value_kind: ValueKind::Boolean,
            template_id: TemplateId::new("settings-catalog"),
            family: TemplateFamily::EndpointSecurity,
            platform: None,
            is_active: true,
        }
    }

    fn tree_document() -> serde_json::Value {
        json!({
            "settings": [
                {
                    "id": "0",
                    "settingInstance": {
                        "settingDefinitionId": "bitlocker_requireDeviceEncryption",
                        "simpleSettingValue": {"value": true}
                    }
                },
                {
                    "id": "1",
                    "settingInstance": {
                        "settingDefinitionId": "bitlocker_systemDrivePolicy",
                        "groupSettingCollectionValue": [
                            {
                                "children": [
                                    {
                                        "settingDefinitionId":
                                            "bitlocker_systemDrivePolicy_encryptionType",
                                        "choiceSettingValue": {
                                            "value":
                                                "bitlocker_systemdrivepolicy_encryptiontype_xtsaes256",
                                            "children": []
                                        }
                                    },
                                    {
                                        "settingDefinitionId":
                                            "bitlocker_systemDrivePolicy_startupAuth",
                                        "choiceSettingValue": {
                                            "value":
                                                "bitlocker_systemdrivepolicy_startupauth_1",
                                            "children": [
                                                {
                                                    "settingDefinitionId":
                                                        "bitlocker_systemDrivePolicy_startupAuth_pin",
                                                    "simpleSettingValue": {"value": 6}
                                                }
                                            ]
                                        }
                                    }
                                ]
                            }
                        ]
                    }
                }
            ]
        })
    }

    #[test]
    fn flattening_records_depth_and_parent() {
        let index = CatalogIndex::from_document(&tree_document());
        let pin = index.entry("bitlocker_systemdrivepolicy_startupauth_pin").unwrap();
        assert_eq!(pin.depth, 2);
        assert_eq!(pin.parent.as_deref(), Some("bitlocker_systemdrivepolicy_startupauth"));
        let root = index.entry("bitlocker_requiredeviceencryption").unwrap();
        assert_eq!(root.depth, 0);
        assert!(root.parent.is_none());
    }

    #[test]
    fn exact_definition_id_match_wins() {
        let index = CatalogIndex::from_document(&tree_document());
        let result = index.resolve(&definition("bitlocker_requireDeviceEncryption", None)).unwrap();
        assert_eq!(result.value, json!(true));
        assert_eq!(result.confidence, MatchConfidence::Exact);
        assert_eq!(result.provenance, "bitlocker_requiredeviceencryption");
    }

    #[test]
    fn containment_falls_back_to_partial() {
        let index = CatalogIndex::from_document(&tree_document());
        let result = index.resolve(&definition("startupAuth_pin", None)).unwrap();
        assert_eq!(result.value, json!(6));
        assert_eq!(result.confidence, MatchConfidence::Partial);
    }

    #[test]
    fn choice_literal_decodes_through_option_table() {
        let index = CatalogIndex::from_document(&tree_document());
        let result =
            index.resolve(&definition("bitlocker_systemDrivePolicy_encryptionType", None)).unwrap();
        assert_eq!(result.value, json!("xtsaes256"));
    }

    #[test]
    fn numeric_choice_suffix_decodes_to_enabled() {
        let index = CatalogIndex::from_document(&tree_document());
        let result =
            index.resolve(&definition("bitlocker_systemDrivePolicy_startupAuth", None)).unwrap();
        assert_eq!(result.value, json!("enabled"));
    }

    #[test]
    fn group_nodes_are_not_extractable_values() {
        let index = CatalogIndex::from_document(&tree_document());
        let entry = index.entry("bitlocker_systemdrivepolicy").unwrap();
        assert_eq!(entry.kind, CatalogValueKind::GroupCollection);
        assert!(entry.value.is_null());
        // A definition naming only the group id must not resolve to the
        // group's null value; PIN-style leaves require the child id.
        let exact = definition("bitlocker_systemdrivepolicy", None);
        let resolved = index.resolve(&exact).unwrap();
        assert_ne!(resolved.provenance, "bitlocker_systemdrivepolicy");
    }

    #[test]
    fn absent_definition_resolves_to_none() {
        let index = CatalogIndex::from_document(&tree_document());
        assert!(index.resolve(&definition("firewall_enableFirewall", None)).is_none());
    }

    #[test]
    fn setting_path_participates_in_containment() {
        let index = CatalogIndex::from_document(&tree_document());
        let result = index
            .resolve(&definition("no_such_name", Some("systemDrivePolicy_encryptionType")))
            .unwrap();
        assert_eq!(result.value, json!("xtsaes256"));
    }
}
