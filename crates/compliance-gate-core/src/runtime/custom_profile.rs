// crates/compliance-gate-core/src/runtime/custom_profile.rs
// ============================================================================
// Module: Custom Profile Extractor
// Description: Decodes and indexes URI-addressed custom-profile entries.
// Purpose: Resolve catalogued setting values from OMA-URI style documents.
// Dependencies: crate::core, base64, serde_json
// ============================================================================

//! ## Overview
//! Custom configuration profiles address settings by hierarchical path
//! strings rather than flat keys, with values optionally base64-encoded. The
//! extractor decodes base64 entries (re-parsing decoded text as JSON when it
//! opens with `{`/`[`; XML stays raw text), canonicalizes each URI by
//! stripping the device/user scope segment and the vendor policy-config
//! prefix, and indexes both the canonical and the raw path. Lookups walk
//! four steps from exact path equality down to token-overlap scoring with a
//! fifty-percent-or-at-least-two-terms acceptance threshold, so a single
//! coincidental token never produces a match.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::core::catalog::SettingDefinition;
use crate::core::checks::ExtractionResult;
use crate::core::checks::ExtractionStrategy;
use crate::core::checks::MatchConfidence;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scope prefixes stripped from the front of an OMA URI.
const SCOPE_PREFIXES: [&str; 3] = ["./device/", "./user/", "./"];

/// Vendor prefixes stripped after the scope segment.
const VENDOR_PREFIXES: [&str; 2] = ["vendor/msft/policy/config/", "vendor/msft/"];

/// Minimum fragment length considered during token-overlap scoring.
const MIN_FRAGMENT_LEN: usize = 3;

// ============================================================================
// SECTION: Profile Entries
// ============================================================================

/// One decoded custom-profile entry.
///
/// # Invariants
/// - `canonical_uri` is lower-cased with scope and vendor prefixes removed.
/// - `raw_uri` preserves the original casing for token splitting and audit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    /// Canonical lookup path.
    pub canonical_uri: String,
    /// Original URI as authored.
    pub raw_uri: String,
    /// Decoded value.
    pub value: Value,
}

/// Index over one custom-profile document's entries.
///
/// # Invariants
/// - Built once per policy; lookups never re-decode entries.
#[derive(Debug, Default)]
pub struct ProfileIndex {
    /// Decoded entries in document order.
    entries: Vec<ProfileEntry>,
}

impl ProfileIndex {
    /// Builds the index from the document's `omaSettings` array.
    #[must_use]
    pub fn from_document(document: &Value) -> Self {
        let mut entries = Vec::new();
        let Some(settings) = document.get("omaSettings").and_then(Value::as_array) else {
            return Self {
                entries,
            };
        };
        for setting in settings {
            let Some(uri) = setting.get("omaUri").and_then(Value::as_str) else {
                continue;
            };
            let raw_value = setting.get("value").cloned().unwrap_or(Value::Null);
            let value = if is_base64_entry(setting) {
                decode_base64_value(&raw_value)
            } else {
                raw_value
            };
            entries.push(ProfileEntry {
                canonical_uri: canonicalize_uri(uri),
                raw_uri: uri.to_string(),
                value,
            });
        }
        Self {
            entries,
        }
    }

    /// Returns the number of decoded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a setting definition against the decoded entries.
    ///
    /// Tries, in order: exact canonical-path match on `setting_path`, exact
    /// canonical-path match on `setting_name`, substring containment either
    /// direction, then token-overlap scoring.
    #[must_use]
    pub fn resolve(&self, definition: &SettingDefinition) -> Option<ExtractionResult> {
        let path_needle = definition.setting_path.as_deref().map(canonicalize_uri);
        let name_needle = canonicalize_uri(&definition.setting_name);

        if let Some(path) = &path_needle
            && let Some(entry) = self.find_exact(path)
        {
            return Some(build_result(entry, MatchConfidence::Exact));
        }
        if let Some(entry) = self.find_exact(&name_needle) {
            return Some(build_result(entry, MatchConfidence::Exact));
        }

        let mut needles: Vec<&str> = Vec::new();
        if let Some(path) = &path_needle {
            needles.push(path.as_str());
        }
        needles.push(name_needle.as_str());
        for entry in &self.entries {
            let contained = needles.iter().any(|needle| {
                !needle.is_empty()
                    && !entry.canonical_uri.is_empty()
                    && (entry.canonical_uri.contains(needle)
                        || needle.contains(entry.canonical_uri.as_str()))
            });
            if contained {
                return Some(build_result(entry, MatchConfidence::Partial));
            }
        }

        self.resolve_by_token_overlap(&definition.display_name)
    }

    /// Finds an entry whose canonical (or raw lower-cased) path equals the needle.
    fn find_exact(&self, needle: &str) -> Option<&ProfileEntry> {
        if needle.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            entry.canonical_uri == needle || entry.raw_uri.to_lowercase() == needle
        })
    }

    /// Scores entries by overlapping word fragments against the display name.
    ///
    /// Fragments come from the URI with the scope and vendor prefixes
    /// stripped, so boilerplate segments (`device`, `vendor`, `msft`,
    /// `policy`, `config`) never count toward an overlap. The best candidate
    /// is accepted only when its overlap reaches
    /// `max(2, 0.5 x search fragments)`; ties keep the earlier entry.
    fn resolve_by_token_overlap(&self, display_name: &str) -> Option<ExtractionResult> {
        let search_fragments = word_fragments(display_name);
        if search_fragments.is_empty() {
            return None;
        }
        let mut best: Option<(&ProfileEntry, usize)> = None;
        for entry in &self.entries {
            let entry_fragments = word_fragments(canonical_tail(&entry.raw_uri));
            let overlap = entry_fragments.intersection(&search_fragments).count();
            if best.is_none_or(|(_, best_overlap)| overlap > best_overlap) {
                best = Some((entry, overlap));
            }
        }
        let (entry, overlap) = best?;
        if overlap < 2 || overlap * 2 < search_fragments.len() {
            return None;
        }
        Some(build_result(entry, MatchConfidence::Fuzzy))
    }
}

/// Builds an extraction result from a matched entry.
fn build_result(entry: &ProfileEntry, confidence: MatchConfidence) -> ExtractionResult {
    ExtractionResult {
        value: entry.value.clone(),
        strategy: ExtractionStrategy::CustomProfile,
        confidence,
        provenance: entry.raw_uri.clone(),
    }
}

// ============================================================================
// SECTION: URI Canonicalization
// ============================================================================

/// Canonicalizes an OMA URI into the primary lookup key.
///
/// Lower-cases, strips the leading device/user scope segment, then strips
/// the vendor policy-config prefix. Paths that carry neither pass through
/// lower-cased (catalog `setting_path` values are usually already bare).
#[must_use]
pub fn canonicalize_uri(uri: &str) -> String {
    let mut path = uri.to_lowercase();
    for prefix in SCOPE_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
            break;
        }
    }
    for prefix in VENDOR_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
            break;
        }
    }
    path
}

/// Strips the scope and vendor prefixes while preserving the original case.
///
/// Token splitting needs the camel-case boundaries the lower-cased canonical
/// form erases, so overlap scoring fragments this tail instead.
fn canonical_tail(uri: &str) -> &str {
    let mut tail = uri;
    for prefix in SCOPE_PREFIXES {
        if let Some(head) = tail.get(..prefix.len())
            && head.eq_ignore_ascii_case(prefix)
            && let Some(rest) = tail.get(prefix.len()..)
        {
            tail = rest;
            break;
        }
    }
    for prefix in VENDOR_PREFIXES {
        if let Some(head) = tail.get(..prefix.len())
            && head.eq_ignore_ascii_case(prefix)
            && let Some(rest) = tail.get(prefix.len()..)
        {
            tail = rest;
            break;
        }
    }
    tail
}

// ============================================================================
// SECTION: Base64 Decoding
// ============================================================================

/// Returns true when the entry's type tag indicates base64 encoding.
fn is_base64_entry(setting: &Value) -> bool {
    setting
        .get("@odata.type")
        .and_then(Value::as_str)
        .is_some_and(|tag| tag.to_lowercase().contains("base64"))
}

/// Decodes a base64 string value, re-parsing structured text.
///
/// Decoded text opening with `{` or `[` is treated as a nested key-value
/// document; anything else (XML included) stays raw text. Entries that fail
/// to decode keep their original literal.
fn decode_base64_value(value: &Value) -> Value {
    let Some(encoded) = value.as_str() else {
        return value.clone();
    };
    let Ok(bytes) = BASE64.decode(encoded.trim()) else {
        return value.clone();
    };
    let Ok(text) = String::from_utf8(bytes) else {
        return value.clone();
    };
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
            return parsed;
        }
    }
    Value::String(text)
}

// ============================================================================
// SECTION: Token Splitting
// ============================================================================

/// Splits text into lower-cased word fragments longer than two characters.
///
/// Fragments break on non-alphanumeric boundaries and on camel-case
/// transitions, so `MaxInactivityTimeDeviceLock` yields `max`, `inactivity`,
/// `time`, `device`, `lock`.
fn word_fragments(text: &str) -> BTreeSet<String> {
    let mut fragments = BTreeSet::new();
    for chunk in text.split(|c: char| !c.is_alphanumeric()) {
        let mut current = String::new();
        let mut prev_lower = false;
        for c in chunk.chars() {
            if c.is_uppercase() && prev_lower {
                push_fragment(&mut fragments, &current);
                current.clear();
            }
            prev_lower = c.is_lowercase() || c.is_numeric();
            current.extend(c.to_lowercase());
        }
        push_fragment(&mut fragments, &current);
    }
    fragments
}

/// Records a fragment when it clears the minimum length.
fn push_fragment(fragments: &mut BTreeSet<String>, fragment: &str) {
    if fragment.len() >= MIN_FRAGMENT_LEN {
        fragments.insert(fragment.to_string());
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

    fn definition(
        display_name: &str,
        setting_name: &str,
        setting_path: Option<&str>,
    ) -> SettingDefinition {
        SettingDefinition {
            id: SettingId::from_raw(1).unwrap(),
            display_name: display_name.to_string(),
            description: None,
            setting_name: setting_name.to_string(),
            setting_path: setting_path.map(str::to_string),
            aliases: Vec::new(),
            expected_value: "30".to_string(),
            operator: ValidationOperator::LessThan,
            value_kind: ValueKind::Number,
            template_id: TemplateId::new("custom-profile"),
            family: TemplateFamily::Configuration,
            platform: None,
            is_active: true,
        }
    }

    fn profile_document() -> serde_json::Value {
        json!({
            "omaSettings": [
                {
                    "omaUri": "./Device/Vendor/MSFT/Policy/Config/DeviceLock/MaxInactivityTimeDeviceLock",
                    "value": 15
                },
                {
                    "omaUri": "./User/Vendor/MSFT/Policy/Config/Browser/AllowPopups",
                    "value": 0
                }
            ]
        })
    }

    #[test]
    fn canonicalization_strips_scope_and_vendor_prefixes() {
        assert_eq!(
            canonicalize_uri("./Device/Vendor/MSFT/Policy/Config/DeviceLock/MaxInactivityTimeDeviceLock"),
            "devicelock/maxinactivitytimedevicelock"
        );
        assert_eq!(canonicalize_uri("DeviceLock/MaxInactivityTimeDeviceLock"),
            "devicelock/maxinactivitytimedevicelock");
    }

    #[test]
    fn exact_setting_path_match_is_exact_confidence() {
        let index = ProfileIndex::from_document(&profile_document());
        let result = index
            .resolve(&definition(
                "Max inactivity before lock",
                "maxInactivityTimeDeviceLock",
                Some("DeviceLock/MaxInactivityTimeDeviceLock"),
            ))
            .unwrap();
        assert_eq!(result.value, json!(15));
        assert_eq!(result.confidence, MatchConfidence::Exact);
    }

    #[test]
    fn containment_matches_partial() {
        let index = ProfileIndex::from_document(&profile_document());
        let result = index.resolve(&definition("Popups", "allowpopups", None)).unwrap();
        assert_eq!(result.value, json!(0));
        assert_eq!(result.confidence, MatchConfidence::Partial);
    }

    #[test]
    fn token_overlap_requires_two_terms_and_half_coverage() {
        let index = ProfileIndex::from_document(&profile_document());
        // Four search fragments (max/inactivity/device/lock vs URI fragments)
        // overlap on all four.
        let result = index
            .resolve(&definition("Max Inactivity Device Lock", "unrelated-name", None))
            .unwrap();
        assert_eq!(result.value, json!(15));
        assert_eq!(result.confidence, MatchConfidence::Fuzzy);
        // A single coincidental term never matches.
        assert!(index.resolve(&definition("Device posture", "nope", None)).is_none());
    }

    #[test]
    fn scope_and_vendor_terms_do_not_count_toward_overlap() {
        let index = ProfileIndex::from_document(&profile_document());
        // Every term here appears in the raw URI boilerplate but only one
        // survives the prefix strip, so the threshold is never reached.
        assert!(index
            .resolve(&definition("Device Policy Config", "unrelated-name", None))
            .is_none());
    }

    #[test]
    fn base64_json_entries_reparse_structurally() {
        let encoded = BASE64.encode(r#"{"allowList":["a","b"]}"#);
        let document = json!({
            "omaSettings": [{
                "omaUri": "./Device/Vendor/MSFT/AppLocker/ApplicationLaunchRestrictions",
                "@odata.type": "#microsoft.graph.omaSettingBase64",
                "value": encoded
            }]
        });
        let index = ProfileIndex::from_document(&document);
        let result = index
            .resolve(&definition(
                "Application launch restrictions",
                "applocker/applicationlaunchrestrictions",
                None,
            ))
            .unwrap();
        assert_eq!(result.value, json!({"allowList": ["a", "b"]}));
    }

    #[test]
    fn base64_xml_entries_stay_raw_text() {
        let encoded = BASE64.encode("<RuleCollection Type=\"Exe\"/>");
        let document = json!({
            "omaSettings": [{
                "omaUri": "./Device/Vendor/MSFT/AppLocker/Exe/Policy",
                "@odata.type": "#microsoft.graph.omaSettingBase64",
                "value": encoded
            }]
        });
        let index = ProfileIndex::from_document(&document);
        let result =
            index.resolve(&definition("AppLocker exe policy", "applocker/exe/policy", None)).unwrap();
        assert_eq!(result.value, json!("<RuleCollection Type=\"Exe\"/>"));
    }

    #[test]
    fn camel_case_splitting_produces_short_free_fragments() {
        let fragments = word_fragments("MaxInactivityTimeDeviceLock");
        assert!(fragments.contains("max"));
        assert!(fragments.contains("inactivity"));
        assert!(fragments.contains("device"));
        assert!(fragments.contains("lock"));
        // Length-2 chunks are dropped.
        assert!(!word_fragments("Of It").contains("of"));
    }
}
