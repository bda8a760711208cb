// crates/compliance-gate-core/src/lib.rs
// ============================================================================
// Module: Compliance Gate Core
// Description: Data model, extraction runtime, and collaborator interfaces.
// Purpose: Provide the deterministic settings-to-compliance matching engine.
// Dependencies: serde, serde_json, thiserror, bigdecimal, base64
// ============================================================================

//! ## Overview
//! Compliance Gate ingests policy configuration documents and decides, per
//! catalogued setting definition, whether the configured value satisfies the
//! expected compliance value. The crate is split into three layers:
//! - [`core`]: identifiers, policies, the setting catalog, and check records.
//! - [`runtime`]: document shape classification, value extraction strategies,
//!   keyword categorization, operator validation, and check building.
//! - [`interfaces`]: backend-agnostic contracts for the policy feed, the
//!   setting catalog, and the durable check store.
//!
//! The engine is pure and synchronous: it never fetches policy data, never
//! reads wall-clock time, and its only durable effect flows through the
//! [`interfaces::CheckStore`] contract. One policy's failure never aborts the
//! batch; failures degrade to per-policy or per-setting omissions.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::catalog::ControlSettingMapping;
pub use core::catalog::SettingDefinition;
pub use core::catalog::ValidationOperator;
pub use core::catalog::ValueKind;
pub use core::checks::ComplianceCheck;
pub use core::checks::ExtractionResult;
pub use core::checks::ExtractionStrategy;
pub use core::checks::MatchConfidence;
pub use core::identifiers::ControlId;
pub use core::identifiers::PolicyId;
pub use core::identifiers::SettingId;
pub use core::identifiers::TemplateId;
pub use core::policy::ConfidenceTier;
pub use core::policy::Platform;
pub use core::policy::Policy;
pub use core::policy::PolicySource;
pub use core::policy::TemplateFamily;
pub use core::time::Timestamp;
pub use interfaces::CatalogError;
pub use interfaces::CheckStore;
pub use interfaces::FeedError;
pub use interfaces::PolicyFeed;
pub use interfaces::SettingCatalog;
pub use interfaces::StoreError;
pub use runtime::builder::BatchOutcome;
pub use runtime::builder::CheckBuilder;
pub use runtime::builder::PolicyOutcome;
pub use runtime::builder::SkipReason;
pub use runtime::categorizer::Categorization;
pub use runtime::categorizer::FamilyScore;
pub use runtime::categorizer::categorize;
pub use runtime::orchestrator::PolicyMatcher;
pub use runtime::shape::DocumentError;
pub use runtime::shape::DocumentShape;
pub use runtime::validator::validate;
