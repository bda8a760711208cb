// crates/compliance-gate-core/src/core/policy.rs
// ============================================================================
// Module: Compliance Gate Policy Model
// Description: Policy records, template families, platforms, and confidence tiers.
// Purpose: Represent synced policy documents and their classification metadata.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`Policy`] couples sync metadata with the raw configuration payload
//! exactly as the directory service delivered it. The payload stays an opaque
//! string until the runtime parses it; re-synced documents replace the prior
//! payload wholesale, so no partial-merge state exists here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PolicyId;
use crate::core::identifiers::TemplateId;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Device platform a policy or setting applies to.
///
/// # Invariants
/// - Wire form is stable snake_case for store round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows desktop and server.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Apple iOS and iPadOS.
    Ios,
    /// Android and Android Enterprise.
    Android,
}

impl Platform {
    /// Returns the stable wire label for the platform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "mac_os",
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }

    /// Parses a wire label back into a platform.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "windows" => Some(Self::Windows),
            "mac_os" => Some(Self::MacOs),
            "ios" => Some(Self::Ios),
            "android" => Some(Self::Android),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category a policy template belongs to.
///
/// # Invariants
/// - Wire form is stable snake_case for store round-trips.
/// - `Uncategorized` marks settings awaiting keyword categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFamily {
    /// Device compliance policies (password, OS version, jailbreak state).
    Compliance,
    /// Device configuration profiles (restrictions, device lock, kiosk).
    Configuration,
    /// Endpoint security policies (BitLocker, Defender, firewall).
    EndpointSecurity,
    /// Managed app protection policies (PIN, data transfer, grace periods).
    AppProtection,
    /// Software update rings and deferral policies.
    Update,
    /// Identity and sign-in policies (conditional access, MFA).
    Identity,
    /// No authoritative family assigned yet.
    Uncategorized,
}

impl TemplateFamily {
    /// Returns the stable wire label for the family.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Configuration => "configuration",
            Self::EndpointSecurity => "endpoint_security",
            Self::AppProtection => "app_protection",
            Self::Update => "update",
            Self::Identity => "identity",
            Self::Uncategorized => "uncategorized",
        }
    }

    /// Parses a wire label back into a family.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "compliance" => Some(Self::Compliance),
            "configuration" => Some(Self::Configuration),
            "endpoint_security" => Some(Self::EndpointSecurity),
            "app_protection" => Some(Self::AppProtection),
            "update" => Some(Self::Update),
            "identity" => Some(Self::Identity),
            "uncategorized" => Some(Self::Uncategorized),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence tier for automatic categorization and control mappings.
///
/// # Invariants
/// - Ordered from strongest to weakest; `None` means no assignment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// High confidence (score >= 5 or authoritative mapping).
    High,
    /// Medium confidence (score >= 3).
    Medium,
    /// Low confidence (score >= 1).
    Low,
    /// No confident assignment.
    None,
}

impl ConfidenceTier {
    /// Returns the stable wire label for the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::None => "none",
        }
    }

    /// Parses a wire label back into a tier.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a policy payload.
///
/// # Invariants
/// - Wire form is stable snake_case for store round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    /// Fetched by the external directory sync job.
    Synced,
    /// Imported from an exported policy document.
    Imported,
    /// Entered by an administrator.
    Manual,
}

impl PolicySource {
    /// Returns the stable wire label for the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Imported => "imported",
            Self::Manual => "manual",
        }
    }

    /// Parses a wire label back into a source.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "synced" => Some(Self::Synced),
            "imported" => Some(Self::Imported),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Policy Record
// ============================================================================

/// A synced policy and its raw configuration payload.
///
/// # Invariants
/// - `document` holds the payload verbatim as delivered by the sync
///   collaborator; the engine parses it but never rewrites it.
/// - Re-synced documents replace the prior payload wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier.
    pub id: PolicyId,
    /// Human-readable display name.
    pub display_name: String,
    /// Template identifier naming the document schema.
    pub template_id: TemplateId,
    /// Coarse template family.
    pub family: TemplateFamily,
    /// Payload provenance.
    pub source: PolicySource,
    /// Platform the policy targets, when known.
    pub platform: Option<Platform>,
    /// Raw JSON payload as delivered by the sync collaborator.
    pub document: String,
}
