// crates/compliance-gate-core/src/core/mod.rs
// ============================================================================
// Module: Compliance Gate Core Types
// Description: Canonical data model for policies, the catalog, and checks.
// Purpose: Define the stable records shared by the runtime and stores.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain serializable records. Policies and catalog entries
//! are read-only reference data for a run; the only record the engine itself
//! produces is [`checks::ComplianceCheck`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod checks;
pub mod identifiers;
pub mod policy;
pub mod time;
