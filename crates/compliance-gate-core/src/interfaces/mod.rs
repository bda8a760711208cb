// crates/compliance-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Compliance Gate Interfaces
// Description: Backend-agnostic interfaces for policy feeds, catalogs, and storage.
// Purpose: Define the contract surfaces used by the Compliance Gate runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Compliance Gate integrates with its collaborators
//! without embedding backend-specific details. The engine never fetches or
//! refreshes policy data itself: the feed and catalog are read-only reference
//! data for one run, and the check store is the engine's only durable effect.
//! Implementations must be deterministic and fail closed on invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::catalog::ControlSettingMapping;
use crate::core::catalog::SettingDefinition;
use crate::core::checks::ComplianceCheck;
use crate::core::identifiers::PolicyId;
use crate::core::policy::Policy;

// ============================================================================
// SECTION: Policy Feed
// ============================================================================

/// Policy feed errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed I/O error.
    #[error("policy feed io error: {0}")]
    Io(String),
    /// Feed data is invalid.
    #[error("policy feed invalid data: {0}")]
    Invalid(String),
}

/// Read-only supply of synced policies.
pub trait PolicyFeed {
    /// Loads every policy known to the feed.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when loading fails.
    fn load_policies(&self) -> Result<Vec<Policy>, FeedError>;

    /// Loads one policy by identifier, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when loading fails.
    fn load_policy(&self, policy_id: PolicyId) -> Result<Option<Policy>, FeedError>;
}

// ============================================================================
// SECTION: Setting Catalog
// ============================================================================

/// Setting catalog errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog I/O error.
    #[error("setting catalog io error: {0}")]
    Io(String),
    /// Catalog data is invalid.
    #[error("setting catalog invalid data: {0}")]
    Invalid(String),
}

/// Read-only supply of setting definitions and control mappings.
pub trait SettingCatalog {
    /// Loads every active setting definition.
    ///
    /// Inactive definitions are excluded at this boundary so the runtime
    /// never sees them.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when loading fails.
    fn load_active_settings(&self) -> Result<Vec<SettingDefinition>, CatalogError>;

    /// Loads every control-to-setting mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when loading fails.
    fn load_control_mappings(&self) -> Result<Vec<ControlSettingMapping>, CatalogError>;
}

// ============================================================================
// SECTION: Check Store
// ============================================================================

/// Check store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("check store io error: {0}")]
    Io(String),
    /// Store data is invalid.
    #[error("check store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("check store error: {0}")]
    Store(String),
}

/// Durable store for compliance check rows.
pub trait CheckStore {
    /// Replaces all stored checks for one policy with the supplied rows.
    ///
    /// The delete and the inserts must land in one transaction scoped to
    /// `policy_id`, so a rebuild is a full replace and stale rows cannot
    /// survive a definition or template change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the replace fails; on failure the prior
    /// rows must remain intact.
    fn replace_checks(
        &self,
        policy_id: PolicyId,
        checks: &[ComplianceCheck],
    ) -> Result<(), StoreError>;

    /// Lists stored checks for one policy ordered by setting identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_checks(&self, policy_id: PolicyId) -> Result<Vec<ComplianceCheck>, StoreError>;
}
