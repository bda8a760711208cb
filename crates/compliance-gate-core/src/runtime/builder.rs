// crates/compliance-gate-core/src/runtime/builder.rs
// ============================================================================
// Module: Compliance Check Builder
// Description: Per-policy rebuild of durable compliance check rows.
// Purpose: Drive extraction and validation and persist the outcome.
// Dependencies: crate::core, crate::interfaces, crate::runtime, serde
// ============================================================================

//! ## Overview
//! For each policy, the builder matches every active setting definition
//! whose template identifier equals the policy's, extracts a value through
//! the orchestrator, validates it, and persists one check row per resolved
//! value in a single replace call. The replace is a full delete-then-insert
//! scoped to the policy, so no stale rows survive a definition or template
//! change, and reprocessing an unchanged policy is idempotent.
//!
//! Failure containment is local, never global: a payload that fails to
//! parse skips that one policy (leaving its prior rows untouched), an
//! unresolvable setting simply writes no row, and a store failure is
//! recorded on the policy's outcome. Nothing aborts the batch. Counters are
//! explicit return values aggregated per call, not module state, so hosts
//! may process policies in parallel worker tasks as long as the store
//! serializes writes per policy id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::catalog::SettingDefinition;
use crate::core::checks::ComplianceCheck;
use crate::core::identifiers::PolicyId;
use crate::core::policy::Policy;
use crate::core::time::Timestamp;
use crate::interfaces::CheckStore;
use crate::runtime::orchestrator::PolicyMatcher;
use crate::runtime::validator;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Why a policy produced no check rows.
///
/// # Invariants
/// - A skipped policy's prior stored rows are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    /// The raw payload was not well-formed.
    ParseFailed(String),
    /// The store rejected the replace.
    StoreFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailed(detail) => write!(f, "parse failed: {detail}"),
            Self::StoreFailed(detail) => write!(f, "store failed: {detail}"),
        }
    }
}

/// Aggregated result of rebuilding one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyOutcome {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Setting definitions whose template matched the policy.
    pub settings_considered: usize,
    /// Check rows written.
    pub checks_written: usize,
    /// Rows marked compliant.
    pub compliant: usize,
    /// Rows marked non-compliant.
    pub noncompliant: usize,
    /// Set when the policy was skipped without touching stored rows.
    pub skipped: Option<SkipReason>,
}

/// Aggregated result of rebuilding a batch of policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Policies whose rows were replaced.
    pub policies_processed: usize,
    /// Policies skipped by parse or store failure.
    pub policies_skipped: usize,
    /// Total check rows written.
    pub checks_written: usize,
    /// Total rows marked compliant.
    pub compliant: usize,
    /// Total rows marked non-compliant.
    pub noncompliant: usize,
    /// Per-policy outcomes in processing order.
    pub policies: Vec<PolicyOutcome>,
}

impl BatchOutcome {
    /// Folds one policy outcome into the batch totals.
    fn absorb(&mut self, outcome: PolicyOutcome) {
        if outcome.skipped.is_some() {
            self.policies_skipped += 1;
        } else {
            self.policies_processed += 1;
        }
        self.checks_written += outcome.checks_written;
        self.compliant += outcome.compliant;
        self.noncompliant += outcome.noncompliant;
        self.policies.push(outcome);
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Rebuilds compliance check rows for policies against a setting catalog.
///
/// # Invariants
/// - The catalog slice is read-only reference data for the builder's life.
/// - The supplied timestamp is stamped on every row written by this builder.
#[derive(Debug)]
pub struct CheckBuilder<'run, S: CheckStore> {
    /// Destination store.
    store: &'run S,
    /// Active setting definitions.
    settings: &'run [SettingDefinition],
    /// Timestamp stamped on produced rows.
    now: Timestamp,
}

impl<'run, S: CheckStore> CheckBuilder<'run, S> {
    /// Creates a builder over a store, a catalog snapshot, and a timestamp.
    #[must_use]
    pub const fn new(store: &'run S, settings: &'run [SettingDefinition], now: Timestamp) -> Self {
        Self {
            store,
            settings,
            now,
        }
    }

    /// Rebuilds all checks for one policy.
    ///
    /// Failures fold into the returned outcome; this method never aborts
    /// the caller's batch.
    #[must_use]
    pub fn rebuild_policy(&self, policy: &Policy) -> PolicyOutcome {
        let matcher = match PolicyMatcher::new(&policy.document) {
            Ok(matcher) => matcher,
            Err(err) => {
                return skipped_outcome(policy.id, SkipReason::ParseFailed(err.to_string()));
            }
        };

        let applicable: Vec<&SettingDefinition> = self
            .settings
            .iter()
            .filter(|definition| definition.is_active)
            .filter(|definition| definition.template_id == policy.template_id)
            .collect();

        let mut checks = Vec::with_capacity(applicable.len());
        for definition in &applicable {
            let Some(result) = matcher.extract(definition) else {
                // Extraction miss: absence, not a false/null row.
                continue;
            };
            let is_compliant = validator::validate(
                &result.value,
                &definition.expected_value,
                definition.operator,
                definition.value_kind,
            );
            checks.push(ComplianceCheck {
                policy_id: policy.id,
                setting_id: definition.id,
                expected_value: definition.expected_value.clone(),
                actual_value: validator::stringify(&result.value),
                is_compliant,
                last_checked: self.now,
            });
        }

        if let Err(err) = self.store.replace_checks(policy.id, &checks) {
            return skipped_outcome(policy.id, SkipReason::StoreFailed(err.to_string()));
        }

        let compliant = checks.iter().filter(|check| check.is_compliant).count();
        PolicyOutcome {
            policy_id: policy.id,
            settings_considered: applicable.len(),
            checks_written: checks.len(),
            compliant,
            noncompliant: checks.len() - compliant,
            skipped: None,
        }
    }

    /// Rebuilds checks for every supplied policy, one policy at a time.
    ///
    /// One policy's failure never aborts processing of subsequent policies.
    #[must_use]
    pub fn rebuild_all(&self, policies: &[Policy]) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        for policy in policies {
            batch.absorb(self.rebuild_policy(policy));
        }
        batch
    }
}

/// Builds the outcome for a policy that wrote no rows.
const fn skipped_outcome(policy_id: PolicyId, reason: SkipReason) -> PolicyOutcome {
    PolicyOutcome {
        policy_id,
        settings_considered: 0,
        checks_written: 0,
        compliant: 0,
        noncompliant: 0,
        skipped: Some(reason),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
