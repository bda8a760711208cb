// crates/compliance-gate-core/src/core/catalog.rs
// ============================================================================
// Module: Compliance Gate Setting Catalog
// Description: Setting definitions, validation operators, and control mappings.
// Purpose: Represent the read-only catalog consumed by the matching engine.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! The setting catalog is a flat table of definitions describing where a
//! configuration value lives (`setting_name`, `setting_path`, aliases) and
//! what it must equal to be compliant (`expected_value`, `operator`,
//! `value_kind`). The catalog is owned by administrative and import
//! processes; the extraction engine only ever reads it, and definitions with
//! `is_active = false` are excluded from matching entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ControlId;
use crate::core::identifiers::SettingId;
use crate::core::identifiers::TemplateId;
use crate::core::policy::ConfidenceTier;
use crate::core::policy::Platform;
use crate::core::policy::TemplateFamily;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Comparison operator stored on a setting definition.
///
/// # Invariants
/// - Wire labels are stable; unrecognized labels degrade to [`Self::Equals`]
///   rather than failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationOperator {
    /// Case-insensitive string equality.
    Equals,
    /// Case-insensitive string inequality.
    NotEquals,
    /// Numeric greater-than (decimal-aware).
    GreaterThan,
    /// Numeric less-than (decimal-aware).
    LessThan,
    /// Case-insensitive substring containment.
    Contains,
    /// Negated substring containment.
    NotContains,
    /// Actual value is present and non-empty.
    IsSet,
}

impl ValidationOperator {
    /// Returns the stable wire label for the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::IsSet => "isSet",
        }
    }

    /// Parses an operator label, degrading unknown names to strict equality.
    ///
    /// Unknown operators are a catalog authoring slip, not a fatal condition;
    /// the engine treats them as `equals` and carries on.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label {
            "notEquals" | "not_equals" | "!=" => Self::NotEquals,
            "greaterThan" | "greater_than" | ">" => Self::GreaterThan,
            "lessThan" | "less_than" | "<" => Self::LessThan,
            "contains" => Self::Contains,
            "notContains" | "not_contains" => Self::NotContains,
            "isSet" | "is_set" | "isset" => Self::IsSet,
            _ => Self::Equals,
        }
    }
}

impl fmt::Display for ValidationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a setting's expected value.
///
/// # Invariants
/// - `Object` switches the validator into structural subset matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free-form text compared stringwise.
    Text,
    /// Numeric value compared decimal-aware.
    Number,
    /// Boolean compared stringwise after lower-casing.
    Boolean,
    /// Structured object compared with subset semantics.
    Object,
}

impl ValueKind {
    /// Returns the stable wire label for the value kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// Parses a wire label, defaulting unknown labels to text.
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label {
            "number" | "integer" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "object" | "json" => Self::Object,
            _ => Self::Text,
        }
    }
}

// ============================================================================
// SECTION: Setting Definition
// ============================================================================

/// One catalogued setting definition.
///
/// # Invariants
/// - `setting_name` is the canonical definition-id or property key; for
///   catalog-tree settings whose compliance value lives on a child node, the
///   catalog authors point `setting_name` at the child definition id
///   directly rather than relying on the extractor to pick one.
/// - `setting_path` is a human-authored fallback path (dotted for property
///   bags, slash-separated for URI-addressed profiles).
/// - `aliases` lists alternate legacy property names for the classic matcher.
/// - Definitions with `is_active = false` never participate in matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDefinition {
    /// Setting identifier.
    pub id: SettingId,
    /// Human-readable display name.
    pub display_name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Canonical definition-id or property key.
    pub setting_name: String,
    /// Human-authored fallback path.
    pub setting_path: Option<String>,
    /// Declared alternate property names.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Expected compliance value (stringified).
    pub expected_value: String,
    /// Comparison operator.
    pub operator: ValidationOperator,
    /// Declared value type.
    pub value_kind: ValueKind,
    /// Template identifier the definition applies to.
    pub template_id: TemplateId,
    /// Coarse template family.
    pub family: TemplateFamily,
    /// Platform the setting targets, when known.
    pub platform: Option<Platform>,
    /// Whether the definition participates in matching.
    pub is_active: bool,
}

// ============================================================================
// SECTION: Control Mappings
// ============================================================================

/// Association between a setting definition and a compliance control.
///
/// # Invariants
/// - Read-only input to the engine; used only to prioritize settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSettingMapping {
    /// Setting identifier.
    pub setting_id: SettingId,
    /// Compliance control identifier.
    pub control_id: ControlId,
    /// Mapping confidence tier.
    pub confidence: ConfidenceTier,
    /// Free-text rationale for the mapping.
    pub rationale: Option<String>,
}
