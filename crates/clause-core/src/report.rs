//! Result aggregation — heuristic conflicts and solver verdicts into one report
//!
//! `consistent = conflicts.is_empty() && verdict != UNSATISFIABLE`.
//! An `UNKNOWN` verdict counts as consistent and leaves a warning behind.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compiler::SkippedClause;
use crate::detector::ConflictRule;
use crate::solver::Verdict;
use crate::verifier::Strategy;
use crate::Result;

/// A heuristic conflict between two submitted clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Zero-based position in the submitted clause list
    pub clause_index_a: usize,
    pub clause_index_b: usize,
    pub clause_id_a: String,
    pub clause_id_b: String,
    pub rule: ConflictRule,
    pub reason: String,
}

impl std::fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Clause {} vs Clause {}: {}",
            self.clause_index_a + 1,
            self.clause_index_b + 1,
            self.reason
        )
    }
}

/// Outcome of one verification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub conflicts: Vec<ConflictRecord>,
    pub message: String,
    /// Present only when the formal strategy ran
    pub verdict: Option<Verdict>,
    /// Clause ids localized from the unsat core
    pub unsat_core: Vec<String>,
    pub warnings: Vec<String>,
    pub skipped: Vec<SkippedClause>,
    pub strategies: Vec<Strategy>,
    /// SHA-256 of the normalized clause set
    pub fingerprint: String,
}

impl ConsistencyReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Conflict reasons without positions, for order-independent comparison
    pub fn reasons(&self) -> Vec<&str> {
        let mut reasons: Vec<&str> = self.conflicts.iter().map(|c| c.reason.as_str()).collect();
        reasons.sort_unstable();
        reasons
    }
}

// ── Aggregator ────────────────────────────────────────────

/// Accumulates the outputs of whichever strategies ran
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    conflicts: Vec<ConflictRecord>,
    verdict: Option<Verdict>,
    warnings: Vec<String>,
    skipped: Vec<SkippedClause>,
    strategies: Vec<Strategy>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_strategy(&mut self, strategy: Strategy) {
        if !self.strategies.contains(&strategy) {
            self.strategies.push(strategy);
        }
    }

    pub fn add_conflict(&mut self, conflict: ConflictRecord) {
        self.conflicts.push(conflict);
    }

    pub fn add_skipped(&mut self, skipped: SkippedClause) {
        self.warnings.push(format!(
            "clause '{}' excluded from constraints: {}",
            skipped.clause_id, skipped.reason
        ));
        self.skipped.push(skipped);
    }

    pub fn set_verdict(&mut self, verdict: Verdict) {
        if let Verdict::Unknown { ref reason } = verdict {
            warn!(%reason, "solver verdict unknown; treating as consistent");
            self.warnings.push(format!(
                "solver could not determine satisfiability ({}); treated as consistent",
                reason
            ));
        }
        self.verdict = Some(verdict);
    }

    pub fn finish(self, fingerprint: String) -> ConsistencyReport {
        let unsat = self.verdict.as_ref().is_some_and(Verdict::is_unsat);
        let consistent = self.conflicts.is_empty() && !unsat;
        let unsat_core = self
            .verdict
            .as_ref()
            .map(Verdict::core_clause_ids)
            .unwrap_or_default();

        let mut lines = Vec::new();
        if consistent {
            lines.push("All clauses are logically consistent.".to_string());
        }
        if !self.conflicts.is_empty() {
            lines.push(format!(
                "{} potential conflict(s) detected:",
                self.conflicts.len()
            ));
            lines.extend(self.conflicts.iter().map(|c| c.to_string()));
        }
        if unsat {
            lines.push(contradiction_line(&unsat_core));
        }
        lines.extend(self.warnings.iter().map(|w| format!("Warning: {}", w)));

        ConsistencyReport {
            consistent,
            conflicts: self.conflicts,
            message: lines.join("\n"),
            verdict: self.verdict,
            unsat_core,
            warnings: self.warnings,
            skipped: self.skipped,
            strategies: self.strategies,
            fingerprint,
        }
    }
}

fn contradiction_line(core_ids: &[String]) -> String {
    if core_ids.is_empty() {
        "Logic contradiction: the compiled constraints cannot all hold".to_string()
    } else {
        format!(
            "Logic contradiction: clauses {} are mutually exclusive",
            core_ids.join(", ")
        )
    }
}

// ── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Constraint, ConstraintVariable, Relation};
    use crate::ClauseCategory;

    fn conflict(a: usize, b: usize) -> ConflictRecord {
        ConflictRecord {
            clause_index_a: a,
            clause_index_b: b,
            clause_id_a: format!("c{}", a),
            clause_id_b: format!("c{}", b),
            rule: ConflictRule::NoticeVsMinimumTerm,
            reason: "Termination notice (10 days) conflicts with minimum term (90 days)".into(),
        }
    }

    #[test]
    fn test_empty_aggregator_is_consistent() {
        let report = Aggregator::new().finish("h".into());
        assert!(report.consistent);
        assert_eq!(report.message, "All clauses are logically consistent.");
        assert!(report.verdict.is_none());
    }

    #[test]
    fn test_conflict_lines_are_one_based() {
        let mut agg = Aggregator::new();
        agg.add_conflict(conflict(0, 1));
        let report = agg.finish("h".into());
        assert!(!report.consistent);
        assert!(report.message.contains(
            "Clause 1 vs Clause 2: Termination notice (10 days) conflicts with minimum term (90 days)"
        ));
        assert!(report.message.starts_with("1 potential conflict(s) detected:"));
    }

    #[test]
    fn test_unsat_verdict_adds_contradiction_line() {
        let mut agg = Aggregator::new();
        agg.set_verdict(Verdict::Unsatisfiable {
            core: vec![
                Constraint::from_clause(ConstraintVariable::MaxLiabilityUsd, Relation::Lte, 10, "cap"),
                Constraint::from_clause(ConstraintVariable::MaxLiabilityUsd, Relation::Gte, 50, "pen"),
            ],
        });
        let report = agg.finish("h".into());
        assert!(!report.consistent);
        assert_eq!(report.unsat_core, vec!["cap", "pen"]);
        assert_eq!(
            report.message,
            "Logic contradiction: clauses cap, pen are mutually exclusive"
        );
    }

    #[test]
    fn test_unknown_verdict_is_consistent_with_warning() {
        let mut agg = Aggregator::new();
        agg.set_verdict(Verdict::Unknown {
            reason: "solver timed out after 0ms".into(),
        });
        let report = agg.finish("h".into());
        assert!(report.consistent);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.message.contains("Warning: solver could not determine satisfiability"));
    }

    #[test]
    fn test_skipped_clause_surfaces_warning() {
        let mut agg = Aggregator::new();
        agg.add_skipped(SkippedClause {
            clause_id: "d9".into(),
            category: ClauseCategory::Duration,
            reason: "no recognized DURATION qualifier".into(),
        });
        let report = agg.finish("h".into());
        assert!(report.consistent);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.message.contains("clause 'd9' excluded from constraints"));
    }

    #[test]
    fn test_report_to_json() {
        let mut agg = Aggregator::new();
        agg.add_conflict(conflict(0, 2));
        let json = agg.finish("abc".into()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["consistent"], false);
        assert_eq!(value["conflicts"][0]["clause_id_b"], "c2");
        assert_eq!(value["conflicts"][0]["rule"], "notice_vs_minimum_term");
        assert_eq!(value["fingerprint"], "abc");
    }
}
