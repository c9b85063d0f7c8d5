//! Heuristic conflict detector — pairwise rules over propositions
//!
//! Every unordered pair `(i, j)` with `i < j` is checked against three rules
//! in fixed precedence order. At most one conflict is recorded per pair: the
//! first rule that fires wins and later rules are not evaluated for that
//! pair. [`all_rule_hits`] evaluates every rule and exists so callers can see
//! what the precedence hides.
//!
//! Discovery order is outer index ascending, then inner index ascending.

use serde::{Deserialize, Serialize};

use crate::extractor::Proposition;

/// Heuristic rule that produced a conflict, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    NoticeVsMinimumTerm,
    PermissionVsProhibition,
    ExclusivityCollision,
}

impl ConflictRule {
    pub const ALL: [ConflictRule; 3] = [
        ConflictRule::NoticeVsMinimumTerm,
        ConflictRule::PermissionVsProhibition,
        ConflictRule::ExclusivityCollision,
    ];

    /// Evaluate this rule for a pair, in either direction
    pub fn check(&self, a: &Proposition, b: &Proposition) -> Option<String> {
        match self {
            ConflictRule::NoticeVsMinimumTerm => {
                notice_vs_minimum_term(a, b).or_else(|| notice_vs_minimum_term(b, a))
            }
            ConflictRule::PermissionVsProhibition => {
                if permits_what_other_prohibits(a, b) || permits_what_other_prohibits(b, a) {
                    Some("Permission to terminate conflicts with prohibition on termination".to_string())
                } else {
                    None
                }
            }
            ConflictRule::ExclusivityCollision => {
                if a.is_exclusive && b.is_exclusive && !a.parties.is_disjoint(&b.parties) {
                    Some("Multiple exclusive rights granted to same party".to_string())
                } else {
                    None
                }
            }
        }
    }
}

impl std::fmt::Display for ConflictRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConflictRule::NoticeVsMinimumTerm => write!(f, "notice-vs-minimum-term"),
            ConflictRule::PermissionVsProhibition => write!(f, "permission-vs-prohibition"),
            ConflictRule::ExclusivityCollision => write!(f, "exclusivity-collision"),
        }
    }
}

/// A conflict between two propositions, by position in the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConflict {
    pub index_a: usize,
    pub index_b: usize,
    pub rule: ConflictRule,
    pub reason: String,
}

// ── Public API ────────────────────────────────────────────

/// Check every pair and return conflicts in discovery order.
pub fn detect_conflicts(propositions: &[Proposition]) -> Vec<PairConflict> {
    let mut conflicts = Vec::new();

    for (i, a) in propositions.iter().enumerate() {
        for (j, b) in propositions.iter().enumerate().skip(i + 1) {
            if let Some((rule, reason)) = check_pair(a, b) {
                conflicts.push(PairConflict {
                    index_a: i,
                    index_b: j,
                    rule,
                    reason,
                });
            }
        }
    }

    conflicts
}

/// First rule that fires for a pair, if any
pub fn check_pair(a: &Proposition, b: &Proposition) -> Option<(ConflictRule, String)> {
    ConflictRule::ALL
        .iter()
        .find_map(|rule| rule.check(a, b).map(|reason| (*rule, reason)))
}

/// Every rule that fires for a pair, ignoring precedence
pub fn all_rule_hits(a: &Proposition, b: &Proposition) -> Vec<(ConflictRule, String)> {
    ConflictRule::ALL
        .iter()
        .filter_map(|rule| rule.check(a, b).map(|reason| (*rule, reason)))
        .collect()
}

// ── Rules ─────────────────────────────────────────────────

/// `grant` can terminate on N days notice while `term` holds for M days, N < M.
///
/// A zero-day notice is a stated notice period, not a missing one, so
/// `Some(0)` against any positive minimum term conflicts.
fn notice_vs_minimum_term(grant: &Proposition, term: &Proposition) -> Option<String> {
    if !grant.can_terminate {
        return None;
    }
    let notice = grant.notice_days?;
    let min_term = term.min_term_days?;
    if notice < min_term {
        Some(format!(
            "Termination notice ({} days) conflicts with minimum term ({} days)",
            notice, min_term
        ))
    } else {
        None
    }
}

fn permits_what_other_prohibits(permission: &Proposition, prohibition: &Proposition) -> bool {
    permission.is_permission
        && permission.can_terminate
        && prohibition.is_prohibition
        && prohibition.mentions_terminate
}

// ── Tests ─────────────────────────────────────────────────
