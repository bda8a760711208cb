// crates/compliance-gate-core/src/core/time.rs
// ============================================================================
// Module: Compliance Gate Time Model
// Description: Canonical timestamp representation for check records.
// Purpose: Provide deterministic, replayable time values across Compliance Gate records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Compliance Gate stamps check records with explicit time values supplied by
//! the caller. The core engine never reads wall-clock time directly; hosts
//! must supply timestamps when building checks, which keeps rebuilds
//! replayable in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used on compliance check records.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}
