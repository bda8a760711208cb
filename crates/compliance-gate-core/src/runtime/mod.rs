// crates/compliance-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Compliance Gate Runtime
// Description: Document classification, value extraction, and check building.
// Purpose: Turn raw policy documents and catalog entries into compliance checks.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime is a pipeline of pure, bounded-time computations over
//! in-memory documents: [`shape`] classifies a document once, one of
//! [`catalog_tree`], [`custom_profile`], or [`classic`] resolves values,
//! [`validator`] compares them against the catalog's expectations, and
//! [`builder`] persists the outcome through the store interface.
//! [`categorizer`] runs independently, upstream, to assign template families
//! to uncatalogued settings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builder;
pub mod catalog_tree;
pub mod categorizer;
pub mod classic;
pub mod custom_profile;
pub mod orchestrator;
pub mod shape;
pub mod validator;
