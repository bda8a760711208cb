// crates/compliance-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Compliance Gate SQLite Store
// Description: Durable policy, catalog, and check storage backed by SQLite.
// Purpose: Provide the persistence collaborator behind the core interfaces.
// Dependencies: compliance-gate-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate implements the [`compliance_gate_core::PolicyFeed`],
//! [`compliance_gate_core::SettingCatalog`], and
//! [`compliance_gate_core::CheckStore`] contracts over a single `SQLite`
//! database file with WAL support. Check replacement is transactional and
//! scoped per policy id, which is the whole of the serialization the engine
//! relies on.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteComplianceStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
