// crates/compliance-gate-core/src/core/checks.rs
// ============================================================================
// Module: Compliance Gate Check Records
// Description: Extraction results and durable compliance check rows.
// Purpose: Represent the transient and durable outputs of the matching engine.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ExtractionResult`] is the transient outcome of one extractor run:
//! the located value plus provenance describing which strategy found it and
//! where. A [`ComplianceCheck`] is the durable fact built from it. Settings
//! with no resolvable value produce no check row at all; absence, not a
//! false or null record, represents "not observed".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::PolicyId;
use crate::core::identifiers::SettingId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Extraction Results
// ============================================================================

/// Extraction strategy that produced a value.
///
/// # Invariants
/// - Wire labels are stable for audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Flattened settings-catalog tree lookup.
    CatalogTree,
    /// URI-addressed custom-profile lookup.
    CustomProfile,
    /// Flat property bag lookup.
    ClassicProperty,
}

impl ExtractionStrategy {
    /// Returns the stable wire label for the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CatalogTree => "catalog_tree",
            Self::CustomProfile => "custom_profile",
            Self::ClassicProperty => "classic_property",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How precisely the matched location agreed with the definition.
///
/// # Invariants
/// - `Exact` means key/id equality; `Partial` means containment; `Fuzzy`
///   means token-overlap or case-insensitive fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Token-overlap or case-insensitive fallback match.
    Fuzzy,
    /// Containment (substring) match.
    Partial,
    /// Exact key or definition-id match.
    Exact,
}

/// Transient outcome of one extractor run for one setting.
///
/// # Invariants
/// - Never persisted directly; consumed to build a [`ComplianceCheck`].
/// - `provenance` names the concrete key, definition id, or URI matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The located value.
    pub value: Value,
    /// Strategy that located it.
    pub strategy: ExtractionStrategy,
    /// Match precision.
    pub confidence: MatchConfidence,
    /// Concrete location matched inside the document.
    pub provenance: String,
}

// ============================================================================
// SECTION: Compliance Checks
// ============================================================================

/// Durable compliance fact for one (policy, setting) pair.
///
/// # Invariants
/// - `(policy_id, setting_id)` is unique in the store.
/// - Rebuilds delete-then-reinsert all rows for a policy; rows never merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Setting identifier.
    pub setting_id: SettingId,
    /// Expected value (stringified).
    pub expected_value: String,
    /// Actual configured value (stringified).
    pub actual_value: String,
    /// Whether the actual value satisfies the expected value.
    pub is_compliant: bool,
    /// When the check was produced.
    pub last_checked: Timestamp,
}
