// crates/compliance-gate-core/src/runtime/classic.rs
// ============================================================================
// Module: Classic Property Matcher
// Description: Resolves setting values from flat policy property bags.
// Purpose: Serve classic compliance/configuration documents and act as the
//          terminal fallback strategy for every document shape.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Classic documents are flat (optionally one-level-nested) property bags.
//! Resolution tries, in order: direct key lookup by `setting_name`, lookup by
//! any declared alias, lookup by the last dot-segment of `setting_name`
//! (covers prefixed legacy names), dotted-path traversal using
//! `setting_path`, and finally a case-insensitive key scan. JSON `null` is
//! "not found", never a found null.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::catalog::SettingDefinition;
use crate::core::checks::ExtractionResult;
use crate::core::checks::ExtractionStrategy;
use crate::core::checks::MatchConfidence;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a setting definition against a flat property bag.
#[must_use]
pub fn resolve(document: &Value, definition: &SettingDefinition) -> Option<ExtractionResult> {
    let bag = document.as_object()?;

    if let Some(value) = non_null(bag.get(definition.setting_name.as_str())) {
        return Some(build_result(value, &definition.setting_name, MatchConfidence::Exact));
    }

    for alias in &definition.aliases {
        if let Some(value) = non_null(bag.get(alias.as_str())) {
            return Some(build_result(value, alias, MatchConfidence::Exact));
        }
    }

    if let Some(segment) = last_dot_segment(&definition.setting_name)
        && let Some(value) = non_null(bag.get(segment))
    {
        return Some(build_result(value, segment, MatchConfidence::Partial));
    }

    if let Some(path) = &definition.setting_path
        && let Some(value) = traverse_dotted_path(document, path)
    {
        return Some(build_result(value, path, MatchConfidence::Partial));
    }

    if let Some((key, value)) = find_case_insensitive(bag, &definition.setting_name) {
        return Some(build_result(value, key, MatchConfidence::Fuzzy));
    }

    None
}

/// Treats JSON null as an absent value.
fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

/// Returns the last dot-segment of a prefixed legacy name, if any.
fn last_dot_segment(name: &str) -> Option<&str> {
    let (_, segment) = name.rsplit_once('.')?;
    if segment.is_empty() {
        return None;
    }
    Some(segment)
}

/// Traverses a dotted path through nested objects.
fn traverse_dotted_path<'doc>(document: &'doc Value, path: &str) -> Option<&'doc Value> {
    let mut cursor = document;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        cursor = cursor.as_object()?.get(segment)?;
    }
    if cursor.is_null() {
        return None;
    }
    Some(cursor)
}

/// Finds a key by case-insensitive comparison.
fn find_case_insensitive<'bag>(
    bag: &'bag Map<String, Value>,
    name: &str,
) -> Option<(&'bag str, &'bag Value)> {
    let needle = name.to_lowercase();
    bag.iter()
        .find(|(key, value)| key.to_lowercase() == needle && !value.is_null())
        .map(|(key, value)| (key.as_str(), value))
}

/// Builds an extraction result from a matched property.
fn build_result(value: &Value, provenance: &str, confidence: MatchConfidence) -> ExtractionResult {
    ExtractionResult {
        value: value.clone(),
        strategy: ExtractionStrategy::ClassicProperty,
        confidence,
        provenance: provenance.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
