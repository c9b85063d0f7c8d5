//! Clause verifier — one entry point, two strategies
//!
//! The verifier decides which strategy sees which clause from the shape of
//! the input, runs them, and folds their outputs into a single
//! [`ConsistencyReport`].
//!
//! # Strategies
//!
//! - **Heuristic** — free-text clauses (no category and no value, or
//!   category `OTHER`) are extracted into propositions and checked pairwise.
//! - **Formal** — clauses categorized `DURATION` / `LIABILITY` are compiled
//!   into constraints and checked by a fresh solver context.
//!
//! When the caller forces a single strategy with [`Verifier::verify_with`],
//! that strategy receives every clause. With both strategies, clauses are
//! partitioned by shape as above. Conflicts always report positions in the
//! submitted list.
//!
//! # Statelessness
//!
//! A `Verifier` holds only its configuration. Each call builds its own
//! solver context, so a long-lived verifier never carries constraints from
//! one request into the next.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compiler::compile;
use crate::detector::detect_conflicts;
use crate::extractor::{extract_with_window, Proposition};
use crate::normalizer::fingerprint;
use crate::report::{Aggregator, ConflictRecord, ConsistencyReport};
use crate::solver::{SolverContext, SolverLimits};
use crate::{Clause, ClauseCategory, Error, Result, VerifierConfig};

/// Contradiction-checking strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Heuristic,
    Formal,
}

impl Strategy {
    /// Strategies implied by the shape of the input, in run order.
    ///
    /// An empty list selects the heuristic strategy, which is vacuously
    /// consistent.
    pub fn select(clauses: &[Clause]) -> Vec<Strategy> {
        let mut selected = Vec::new();
        if clauses.is_empty() || clauses.iter().any(is_free_text) {
            selected.push(Strategy::Heuristic);
        }
        if clauses.iter().any(|c| !is_free_text(c)) {
            selected.push(Strategy::Formal);
        }
        selected
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strategy::Heuristic => write!(f, "heuristic"),
            Strategy::Formal => write!(f, "formal"),
        }
    }
}

/// Free text: no category and no value, or explicitly `OTHER`
fn is_free_text(clause: &Clause) -> bool {
    match clause.category {
        None => clause.value.is_none(),
        Some(ClauseCategory::Other) => true,
        Some(_) => false,
    }
}

// ── Verifier ──────────────────────────────────────────────

/// Reusable, stateless clause-consistency verifier
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Build a verifier, rejecting unusable configurations
    pub fn new(config: VerifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify clauses with strategies selected from the input shape.
    pub fn verify(&self, clauses: &[Clause]) -> Result<ConsistencyReport> {
        self.verify_with(clauses, &Strategy::select(clauses))
    }

    /// Verify free-text clauses given as plain strings.
    ///
    /// Clause ids are positional (`clause-1`, `clause-2`, ...).
    pub fn check_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<ConsistencyReport> {
        self.verify_with(&Clause::from_texts(texts), &[Strategy::Heuristic])
    }

    /// Verify clauses with an explicit set of strategies.
    ///
    /// # Errors
    /// Returns `DuplicateClauseId` for repeated ids and `InvalidClause` when
    /// a clause routed to the formal strategy lacks a usable category or
    /// value. Validation finishes before any strategy runs.
    pub fn verify_with(
        &self,
        clauses: &[Clause],
        strategies: &[Strategy],
    ) -> Result<ConsistencyReport> {
        check_unique_ids(clauses)?;

        let strategies: BTreeSet<Strategy> = strategies.iter().copied().collect();
        let partition = strategies.len() > 1;
        info!(
            clauses = clauses.len(),
            strategies = ?strategies,
            "verifying clause set"
        );

        let mut aggregator = Aggregator::new();

        for strategy in &strategies {
            let input: Vec<(usize, &Clause)> = clauses
                .iter()
                .enumerate()
                .filter(|(_, c)| !partition || routes_to(c, *strategy))
                .collect();
            aggregator.record_strategy(*strategy);
            match strategy {
                Strategy::Heuristic => self.run_heuristic(&input, &mut aggregator),
                Strategy::Formal => self.run_formal(&input, &mut aggregator)?,
            }
        }

        let report = aggregator.finish(fingerprint(clauses));
        info!(
            consistent = report.consistent,
            conflicts = report.conflicts.len(),
            warnings = report.warnings.len(),
            "verification finished"
        );
        Ok(report)
    }

    // ── Strategy runners ──────────────────────────────────

    fn run_heuristic(&self, input: &[(usize, &Clause)], aggregator: &mut Aggregator) {
        let propositions: Vec<Proposition> = input
            .iter()
            .map(|(_, c)| extract_with_window(&c.text, self.config.anchor_window_chars))
            .collect();

        for conflict in detect_conflicts(&propositions) {
            let (idx_a, clause_a) = input[conflict.index_a];
            let (idx_b, clause_b) = input[conflict.index_b];
            debug!(a = %clause_a.id, b = %clause_b.id, rule = %conflict.rule, "heuristic conflict");
            aggregator.add_conflict(ConflictRecord {
                clause_index_a: idx_a,
                clause_index_b: idx_b,
                clause_id_a: clause_a.id.clone(),
                clause_id_b: clause_b.id.clone(),
                rule: conflict.rule,
                reason: conflict.reason,
            });
        }
    }

    fn run_formal(&self, input: &[(usize, &Clause)], aggregator: &mut Aggregator) -> Result<()> {
        let clauses: Vec<&Clause> = input.iter().map(|(_, c)| *c).collect();
        let compiled = compile(&clauses, self.config.max_domain_value)?;

        let mut ctx = SolverContext::new(self.config.max_domain_value);
        for constraint in compiled.constraints {
            ctx.assert(constraint);
        }
        let verdict = ctx.check(SolverLimits::from_config(&self.config));
        debug!(%verdict, "formal check finished");

        for skipped in compiled.skipped {
            aggregator.add_skipped(skipped);
        }
        aggregator.set_verdict(verdict);
        Ok(())
    }
}

fn routes_to(clause: &Clause, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Heuristic => is_free_text(clause),
        Strategy::Formal => !is_free_text(clause),
    }
}

fn check_unique_ids(clauses: &[Clause]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for clause in clauses {
        if !seen.insert(clause.id.as_str()) {
            return Err(Error::DuplicateClauseId(clause.id.clone()));
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────
