// crates/compliance-gate-core/src/runtime/categorizer.rs
// ============================================================================
// Module: Keyword Categorizer
// Description: Keyword-scoring assignment of template families to settings.
// Purpose: Categorize settings that lack an authoritative template mapping.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Uncatalogued settings are assigned a template family by scoring their
//! display name and description against a declarative rule table: strong
//! keywords weigh 3, ordinary keywords weigh 1, and any exclusion keyword
//! vetoes the family outright. Families scoped to other platforms are
//! skipped. The highest-scoring non-vetoed family wins, with declaration
//! order breaking ties, and every positive-scoring family is retained as an
//! ordered alternative for audit and manual review.
//!
//! Categorization only fires for settings lacking an authoritative mapping;
//! it never overrides an existing high-confidence catalog assignment. That
//! guard lives at the call site, keeping this module a pure function over
//! the rule data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::policy::ConfidenceTier;
use crate::core::policy::Platform;
use crate::core::policy::TemplateFamily;

// ============================================================================
// SECTION: Rule Table
// ============================================================================

/// Keyword weight applied to strong keyword hits.
const STRONG_WEIGHT: i32 = 3;
/// Keyword weight applied to ordinary keyword hits.
const ORDINARY_WEIGHT: i32 = 1;
/// Score forced by any exclusion keyword hit.
const VETO_SCORE: i32 = -100;
/// Minimum score for a high-confidence assignment.
const HIGH_THRESHOLD: i32 = 5;
/// Minimum score for a medium-confidence assignment.
const MEDIUM_THRESHOLD: i32 = 3;
/// Minimum score for a low-confidence assignment.
const LOW_THRESHOLD: i32 = 1;

/// One family's keyword rule set.
///
/// # Invariants
/// - Keywords are lower-cased; scoring lower-cases the input text once.
/// - An empty `platforms` slice means the family accepts all platforms.
#[derive(Debug, Clone, Copy)]
pub struct FamilyRule {
    /// Family assigned when this rule wins.
    pub family: TemplateFamily,
    /// Keywords scoring 3 each.
    pub strong_keywords: &'static [&'static str],
    /// Keywords scoring 1 each.
    pub keywords: &'static [&'static str],
    /// Keywords vetoing the family outright.
    pub exclusions: &'static [&'static str],
    /// Platforms the family applies to (empty = all).
    pub platforms: &'static [Platform],
}

/// Declarative family rule table.
///
/// Declaration order is the tie-break order: when two families score
/// equally, the first-declared family wins.
pub const FAMILY_RULES: [FamilyRule; 6] = [
    FamilyRule {
        family: TemplateFamily::Compliance,
        strong_keywords: &[
            "compliance",
            "jailbroken",
            "rooted",
            "minimum os version",
            "maximum os version",
            "password required",
        ],
        keywords: &["password", "passcode", "os version", "threat level", "grace period"],
        exclusions: &["app protection"],
        platforms: &[],
    },
    FamilyRule {
        family: TemplateFamily::EndpointSecurity,
        strong_keywords: &[
            "bitlocker",
            "defender",
            "firewall",
            "antivirus",
            "attack surface",
            "tamper protection",
        ],
        keywords: &["encryption", "scan", "real-time", "threat", "exploit"],
        exclusions: &["filevault"],
        platforms: &[Platform::Windows],
    },
    FamilyRule {
        family: TemplateFamily::AppProtection,
        strong_keywords: &["app protection", "managed app", "data transfer", "offline grace"],
        keywords: &["pin", "cut", "copy", "paste", "backup", "app"],
        exclusions: &["bitlocker", "firewall"],
        platforms: &[Platform::Ios, Platform::Android],
    },
    FamilyRule {
        family: TemplateFamily::Update,
        strong_keywords: &["update ring", "feature update", "quality update"],
        keywords: &["update", "deferral", "deadline", "servicing"],
        exclusions: &[],
        platforms: &[Platform::Windows],
    },
    FamilyRule {
        family: TemplateFamily::Identity,
        strong_keywords: &["conditional access", "multi-factor", "mfa", "sign-in frequency"],
        keywords: &["authentication", "session", "token", "sign-in"],
        exclusions: &[],
        platforms: &[],
    },
    FamilyRule {
        family: TemplateFamily::Configuration,
        strong_keywords: &["device restriction", "device lock", "kiosk", "custom profile"],
        keywords: &["allow", "block", "disable", "configure", "timeout", "restrict"],
        exclusions: &[],
        platforms: &[],
    },
];

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// One family's score for a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FamilyScore {
    /// Scored family.
    pub family: TemplateFamily,
    /// Total keyword score.
    pub score: i32,
}

/// Outcome of categorizing one setting.
///
/// # Invariants
/// - `alternatives` contains every positive-scoring family, winner included,
///   ordered by descending score then declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    /// Winning family, when any scored at least 1.
    pub family: Option<TemplateFamily>,
    /// Confidence tier derived from the winning score.
    pub confidence: ConfidenceTier,
    /// Ordered positive-scoring families for audit and manual review.
    pub alternatives: Vec<FamilyScore>,
}

/// Categorizes a setting by keyword scoring over the family rule table.
#[must_use]
pub fn categorize(
    display_name: &str,
    description: Option<&str>,
    platform: Option<Platform>,
) -> Categorization {
    let mut text = display_name.to_lowercase();
    if let Some(description) = description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }

    let mut alternatives: Vec<FamilyScore> = Vec::new();
    let mut winner: Option<FamilyScore> = None;
    for rule in &FAMILY_RULES {
        if !platform_applies(rule, platform) {
            continue;
        }
        let score = score_rule(rule, &text);
        if score > 0 {
            alternatives.push(FamilyScore {
                family: rule.family,
                score,
            });
            // Strictly-greater keeps the first-declared family on ties.
            if winner.is_none_or(|best| score > best.score) {
                winner = Some(FamilyScore {
                    family: rule.family,
                    score,
                });
            }
        }
    }
    alternatives.sort_by(|a, b| b.score.cmp(&a.score));

    winner.map_or_else(
        || Categorization {
            family: None,
            confidence: ConfidenceTier::None,
            alternatives: Vec::new(),
        },
        |best| Categorization {
            family: Some(best.family),
            confidence: tier_for_score(best.score),
            alternatives,
        },
    )
}

/// Returns true when the rule's platform set admits the setting's platform.
fn platform_applies(rule: &FamilyRule, platform: Option<Platform>) -> bool {
    if rule.platforms.is_empty() {
        return true;
    }
    match platform {
        Some(platform) => rule.platforms.contains(&platform),
        None => true,
    }
}

/// Scores one rule against the lower-cased setting text.
fn score_rule(rule: &FamilyRule, text: &str) -> i32 {
    if rule.exclusions.iter().any(|keyword| text.contains(keyword)) {
        return VETO_SCORE;
    }
    let strong_hits =
        rule.strong_keywords.iter().filter(|keyword| text.contains(*keyword)).count();
    let ordinary_hits = rule.keywords.iter().filter(|keyword| text.contains(*keyword)).count();
    let strong_hits = i32::try_from(strong_hits).unwrap_or(i32::MAX / STRONG_WEIGHT);
    let ordinary_hits = i32::try_from(ordinary_hits).unwrap_or(i32::MAX);
    strong_hits.saturating_mul(STRONG_WEIGHT).saturating_add(ordinary_hits * ORDINARY_WEIGHT)
}

/// Maps a winning score onto a confidence tier.
const fn tier_for_score(score: i32) -> ConfidenceTier {
    if score >= HIGH_THRESHOLD {
        ConfidenceTier::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceTier::Medium
    } else if score >= LOW_THRESHOLD {
        ConfidenceTier::Low
    } else {
        ConfidenceTier::None
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
