// crates/compliance-gate-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Match Orchestrator
// Description: Fixed-priority dispatch across the extraction strategies.
// Purpose: Resolve one (policy, setting) pair to its first confident match.
// Dependencies: crate::core, crate::runtime
// ============================================================================

//! ## Overview
//! A [`PolicyMatcher`] classifies a policy document once, pre-builds the
//! shape-specific index once, and then serves per-setting extraction calls.
//! Strategies run in a fixed priority order: the catalog-tree extractor,
//! then the custom-profile extractor, then the classic property matcher as
//! the terminal fallback for every shape. The first non-null result wins and
//! no later extractor is consulted, even if its answer would differ: this is
//! a deliberate first-match-wins policy, not a best-of-all-candidates
//! policy. The known precision/recall trade-off is recorded in DESIGN.md.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::catalog::SettingDefinition;
use crate::core::checks::ExtractionResult;
use crate::core::policy::TemplateFamily;
use crate::runtime::catalog_tree::CatalogIndex;
use crate::runtime::classic;
use crate::runtime::custom_profile::ProfileIndex;
use crate::runtime::shape;
use crate::runtime::shape::DocumentError;
use crate::runtime::shape::DocumentShape;

// ============================================================================
// SECTION: Policy Matcher
// ============================================================================

/// Per-policy extraction front end.
///
/// # Invariants
/// - Shape classification and index construction happen exactly once, at
///   construction; `extract` never re-probes the document.
/// - Extraction is pure and bounded; a miss returns `None`, never an error.
#[derive(Debug)]
pub struct PolicyMatcher {
    /// Parsed policy document.
    document: Value,
    /// Classified document shape.
    shape: DocumentShape,
    /// Flattened catalog-tree index, for catalog-tree documents.
    catalog_index: Option<CatalogIndex>,
    /// Decoded custom-profile index, for custom-profile documents.
    profile_index: Option<ProfileIndex>,
}

impl PolicyMatcher {
    /// Parses and classifies a raw payload, pre-building the shape index.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the payload is not well-formed; the
    /// caller skips the whole policy in that case and leaves prior stored
    /// checks untouched.
    pub fn new(payload: &str) -> Result<Self, DocumentError> {
        let (document, shape) = shape::parse_and_classify(payload)?;
        let catalog_index = (shape == DocumentShape::CatalogTree)
            .then(|| CatalogIndex::from_document(&document));
        let profile_index = (shape == DocumentShape::CustomProfile)
            .then(|| ProfileIndex::from_document(&document));
        Ok(Self {
            document,
            shape,
            catalog_index,
            profile_index,
        })
    }

    /// Returns the classified document shape.
    #[must_use]
    pub const fn shape(&self) -> DocumentShape {
        self.shape
    }

    /// Returns the family forced by app-protection field probes, when any.
    #[must_use]
    pub const fn family_override(&self) -> Option<TemplateFamily> {
        match self.shape {
            DocumentShape::Classic {
                family_override,
            } => family_override,
            DocumentShape::CatalogTree | DocumentShape::CustomProfile => None,
        }
    }

    /// Resolves one setting through the fixed strategy priority.
    ///
    /// Catalog-tree first, custom-profile second, classic property matcher
    /// last. First non-null result wins.
    #[must_use]
    pub fn extract(&self, definition: &SettingDefinition) -> Option<ExtractionResult> {
        if let Some(index) = &self.catalog_index
            && let Some(result) = index.resolve(definition)
        {
            return Some(result);
        }
        if let Some(index) = &self.profile_index
            && let Some(result) = index.resolve(definition)
        {
            return Some(result);
        }
        classic::resolve(&self.document, definition)
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
    use crate::core::checks::ExtractionStrategy;
    use crate::core::identifiers::SettingId;
    use crate::core::identifiers::TemplateId;

    fn definition(setting_name: &str) -> SettingDefinition {
        SettingDefinition {
            id: SettingId::from_raw(1).unwrap(),
            display_name: "Require device encryption".to_string(),
            description: None,
            setting_name: setting_name.to_string(),
            setting_path: None,
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

    #[test]
    fn catalog_tree_outranks_classic_for_the_same_setting() {
        // The flat property carries a stale value; the tree carries the
        // current one. First-match-wins must surface the tree's value.
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
        assert_eq!(matcher.shape(), DocumentShape::CatalogTree);
        let result = matcher.extract(&definition("bitlocker_requiredeviceencryption")).unwrap();
        assert_eq!(result.strategy, ExtractionStrategy::CatalogTree);
        assert_eq!(result.value, json!(true));
    }

    #[test]
    fn classic_fallback_serves_tree_documents_for_flat_properties() {
        let payload = json!({
            "passwordMinimumLength": 8,
            "settings": [{
                "settingInstance": {
                    "settingDefinitionId": "unrelated_setting",
                    "simpleSettingValue": {"value": 1}
                }
            }]
        })
        .to_string();
        let matcher = PolicyMatcher::new(&payload).unwrap();
        let result = matcher.extract(&definition("passwordMinimumLength")).unwrap();
        assert_eq!(result.strategy, ExtractionStrategy::ClassicProperty);
        assert_eq!(result.value, json!(8));
    }

    #[test]
    fn unresolvable_settings_yield_none() {
        let payload = json!({"other": 1}).to_string();
        let matcher = PolicyMatcher::new(&payload).unwrap();
        assert!(matcher.extract(&definition("bitlocker_requiredeviceencryption")).is_none());
    }

    #[test]
    fn malformed_payloads_fail_construction() {
        assert!(PolicyMatcher::new("{truncated").is_err());
    }
}
