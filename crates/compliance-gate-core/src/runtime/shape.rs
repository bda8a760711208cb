// crates/compliance-gate-core/src/runtime/shape.rs
// ============================================================================
// Module: Document Shape Classification
// Description: Ordered structural probes that classify raw policy documents.
// Purpose: Select the extraction strategies applicable to a document.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Policy documents arrive in several structurally incompatible shapes: flat
//! property bags ("classic"), nested settings-catalog trees, and URI-addressed
//! custom profiles. Classification runs ordered structural probes over the
//! parsed document rather than trusting a declared type tag alone, and is a
//! pure function of the document: the shape is computed once per policy and
//! never re-probed per setting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::policy::TemplateFamily;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lower-cased type-tag fragments that mark a classic flat-bag document.
///
/// Custom-configuration tags are deliberately absent so the custom-profile
/// probe can still claim documents that carry both a tag and an
/// `omaSettings` array.
const CLASSIC_TYPE_MARKERS: [&str; 6] = [
    "compliancepolicy",
    "generaldeviceconfiguration",
    "devicerestrictions",
    "endpointprotectionconfiguration",
    "managedappprotection",
    "windowsinformationprotection",
];

/// Document fields that mark an app-protection policy even without a tag.
const APP_PROTECTION_MARKERS: [&str; 4] = [
    "periodOfflineBeforeAccessCheck",
    "allowedDataStorageLocations",
    "dataBackupBlocked",
    "pinRequired",
];

/// Document fields that may carry the declared type tag.
const TYPE_TAG_FIELDS: [&str; 2] = ["@odata.type", "policyType"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a raw policy payload is not well-formed JSON.
///
/// # Invariants
/// - A parse failure skips the whole policy; prior stored checks for that
///   policy are left untouched.
#[derive(Debug, Error)]
#[error("policy document is not well-formed: {0}")]
pub struct DocumentError(pub String);

// ============================================================================
// SECTION: Document Shapes
// ============================================================================

/// Structural shape of a policy document.
///
/// # Invariants
/// - Computed once per document; strategy order is derived from the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Flat (optionally one-level-nested) property bag.
    Classic {
        /// Family forced by app-protection-only field probes, when any.
        family_override: Option<TemplateFamily>,
    },
    /// Nested settings-catalog tree.
    CatalogTree,
    /// Array of URI-addressed custom-profile entries.
    CustomProfile,
}

/// Parses a raw payload and classifies its shape.
///
/// # Errors
///
/// Returns [`DocumentError`] when the payload is not well-formed JSON or is
/// not a JSON object.
pub fn parse_and_classify(payload: &str) -> Result<(Value, DocumentShape), DocumentError> {
    let document: Value =
        serde_json::from_str(payload).map_err(|err| DocumentError(err.to_string()))?;
    if !document.is_object() {
        return Err(DocumentError("top-level payload must be a JSON object".to_string()));
    }
    let shape = classify(&document);
    Ok((document, shape))
}

/// Classifies a parsed document using ordered structural probes.
///
/// Probe order: declared classic type tag, settings-catalog array,
/// custom-profile array, app-protection field markers. First probe wins.
#[must_use]
pub fn classify(document: &Value) -> DocumentShape {
    if has_classic_type_tag(document) {
        return DocumentShape::Classic {
            family_override: None,
        };
    }
    if has_catalog_settings(document) {
        return DocumentShape::CatalogTree;
    }
    if has_custom_profile_entries(document) {
        return DocumentShape::CustomProfile;
    }
    if has_app_protection_markers(document) {
        return DocumentShape::Classic {
            family_override: Some(TemplateFamily::AppProtection),
        };
    }
    DocumentShape::Classic {
        family_override: None,
    }
}

// ============================================================================
// SECTION: Structural Probes
// ============================================================================

/// Returns true when the document carries a known classic type tag.
fn has_classic_type_tag(document: &Value) -> bool {
    TYPE_TAG_FIELDS.iter().any(|field| {
        document
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|tag| {
                let tag = tag.to_lowercase();
                CLASSIC_TYPE_MARKERS.iter().any(|marker| tag.contains(marker))
            })
    })
}

/// Returns true when the document carries a settings-catalog array whose
/// elements wrap a `settingInstance`.
fn has_catalog_settings(document: &Value) -> bool {
    document
        .get("settings")
        .and_then(Value::as_array)
        .is_some_and(|settings| {
            settings
                .iter()
                .any(|element| element.get("settingInstance").is_some_and(Value::is_object))
        })
}

/// Returns true when the document carries URI-addressed custom entries.
fn has_custom_profile_entries(document: &Value) -> bool {
    document
        .get("omaSettings")
        .and_then(Value::as_array)
        .is_some_and(|entries| {
            entries.iter().any(|entry| entry.get("omaUri").is_some_and(Value::is_string))
        })
}

/// Returns true when app-protection-only fields are present.
fn has_app_protection_markers(document: &Value) -> bool {
    APP_PROTECTION_MARKERS.iter().any(|marker| document.get(marker).is_some())
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
    fn type_tag_wins_over_later_probes() {
        let document = json!({
            "@odata.type": "#microsoft.graph.windows10CompliancePolicy",
            "settings": [{"settingInstance": {}}],
        });
        assert_eq!(
            classify(&document),
            DocumentShape::Classic {
                family_override: None
            }
        );
    }

    #[test]
    fn settings_instances_classify_as_catalog_tree() {
        let document = json!({
            "name": "Disk encryption baseline",
            "settings": [{"id": "0", "settingInstance": {"settingDefinitionId": "x"}}],
        });
        assert_eq!(classify(&document), DocumentShape::CatalogTree);
    }

    #[test]
    fn oma_entries_classify_as_custom_profile() {
        let document = json!({
            "omaSettings": [{"omaUri": "./Device/Vendor/MSFT/Policy/Config/X/Y", "value": 1}],
        });
        assert_eq!(classify(&document), DocumentShape::CustomProfile);
    }

    #[test]
    fn custom_configuration_tag_does_not_block_custom_profile() {
        let document = json!({
            "@odata.type": "#microsoft.graph.windows10CustomConfiguration",
            "omaSettings": [{"omaUri": "./Device/Vendor/MSFT/Policy/Config/X/Y", "value": 1}],
        });
        assert_eq!(classify(&document), DocumentShape::CustomProfile);
    }

    #[test]
    fn app_protection_fields_force_family() {
        let document = json!({
            "pinRequired": true,
            "periodOfflineBeforeAccessCheck": "PT12H",
        });
        assert_eq!(
            classify(&document),
            DocumentShape::Classic {
                family_override: Some(TemplateFamily::AppProtection)
            }
        );
    }

    #[test]
    fn untagged_bag_defaults_to_classic() {
        let document = json!({"passwordMinimumLength": 8});
        assert_eq!(
            classify(&document),
            DocumentShape::Classic {
                family_override: None
            }
        );
    }

    #[test]
    fn malformed_payload_is_a_document_error() {
        assert!(parse_and_classify("{not json").is_err());
        assert!(parse_and_classify("[1, 2]").is_err());
    }
}
