//! Satisfiability engine — bounded-integer constraints checked with Z3
//!
//! Every constraint variable is declared as a Z3 `Int` with domain
//! `[0, max_domain_value]`. Clause constraints are asserted with
//! `assert_and_track` under one tracking literal each, so an UNSAT answer
//! carries the clauses behind the contradiction. Domain bounds are asserted
//! untracked and never appear in a core.
//!
//! # Lifecycle
//!
//! A [`SolverContext`] lives for one verification call. `check` consumes it
//! and builds a fresh `z3::Context`, so assertions cannot carry over into
//! another request.
//!
//! # Limits
//!
//! Checks run under the Z3 `timeout` parameter. A timeout or any other
//! incomplete answer yields [`Verdict::Unknown`], never an error.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, Params, SatResult, Solver};

use crate::compiler::{Constraint, ConstraintVariable, Relation};
use crate::VerifierConfig;

// ── Result Types ──────────────────────────────────────────

/// Three-valued outcome of a satisfiability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Constraints admit an assignment; `model` is one witness
    Satisfiable {
        model: BTreeMap<ConstraintVariable, i64>,
    },
    /// No assignment exists; `core` is a conflicting subset of clause constraints
    Unsatisfiable { core: Vec<Constraint> },
    /// The solver gave up before reaching an answer
    Unknown { reason: String },
}

impl Verdict {
    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Satisfiable { .. })
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Verdict::Unsatisfiable { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Verdict::Unknown { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Satisfiable { .. } => "SATISFIABLE",
            Verdict::Unsatisfiable { .. } => "UNSATISFIABLE",
            Verdict::Unknown { .. } => "UNKNOWN",
        }
    }

    /// Clause ids behind the unsat core, in assertion order.
    /// Empty unless unsatisfiable.
    pub fn core_clause_ids(&self) -> Vec<String> {
        match self {
            Verdict::Unsatisfiable { core } => core
                .iter()
                .filter_map(|c| c.source_clause_id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resource limits for one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverLimits {
    pub timeout: Duration,
}

impl SolverLimits {
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.solver_timeout_ms),
        }
    }
}

// ── Solver Context ────────────────────────────────────────

/// Call-scoped solver state: declared variables plus asserted constraints
#[derive(Debug, Clone)]
pub struct SolverContext {
    assertions: Vec<Constraint>,
}

impl SolverContext {
    /// Declare every variable with domain `[0, max_domain_value]`
    pub fn new(max_domain_value: i64) -> Self {
        let mut ctx = Self {
            assertions: Vec::new(),
        };
        for var in ConstraintVariable::ALL {
            ctx.assert(Constraint::builtin(var, Relation::Gte, 0));
            ctx.assert(Constraint::builtin(var, Relation::Lte, max_domain_value));
        }
        ctx
    }

    pub fn assert(&mut self, constraint: Constraint) {
        self.assertions.push(constraint);
    }

    pub fn assertions(&self) -> &[Constraint] {
        &self.assertions
    }

    /// Hand every assertion to a fresh Z3 solver and decide satisfiability.
    pub fn check(self, limits: SolverLimits) -> Verdict {
        if limits.timeout.is_zero() {
            return unknown("solver timed out after 0ms".to_string());
        }

        let started = Instant::now();
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let mut params = Params::new(&ctx);
        params.set_u32("timeout", timeout_ms(limits.timeout));
        params.set_bool("core.minimize", true);
        solver.set_params(&params);

        let vars: BTreeMap<ConstraintVariable, Int> = ConstraintVariable::ALL
            .iter()
            .map(|var| (*var, Int::new_const(&ctx, var.name())))
            .collect();

        // Tracking literal name -> assertion index
        let mut tracked: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, constraint) in self.assertions.iter().enumerate() {
            let expr = encode(&ctx, &vars[&constraint.variable], constraint);
            if constraint.source_clause_id.is_some() {
                let name = format!("track_{}", idx);
                solver.assert_and_track(&expr, &Bool::new_const(&ctx, name.as_str()));
                tracked.insert(name, idx);
            } else {
                solver.assert(&expr);
            }
        }

        debug!(
            assertions = self.assertions.len(),
            tracked = tracked.len(),
            "solver check started"
        );

        let verdict = match solver.check() {
            SatResult::Sat => match solver.get_model() {
                Some(model) => {
                    let model = vars
                        .iter()
                        .filter_map(|(var, int)| {
                            model.eval(int, true).and_then(|v| v.as_i64()).map(|v| (*var, v))
                        })
                        .collect();
                    Verdict::Satisfiable { model }
                }
                None => unknown("solver returned no model".to_string()),
            },
            SatResult::Unsat => {
                let mut core_idx: Vec<usize> = solver
                    .get_unsat_core()
                    .iter()
                    .filter_map(|lit| tracked.get(&lit.to_string()).copied())
                    .collect();
                core_idx.sort_unstable();
                core_idx.dedup();
                let core = core_idx
                    .into_iter()
                    .map(|i| self.assertions[i].clone())
                    .collect();
                Verdict::Unsatisfiable { core }
            }
            SatResult::Unknown => {
                let reason = solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string());
                unknown(format!(
                    "solver gave up after {}ms: {}",
                    limits.timeout.as_millis(),
                    reason
                ))
            }
        };

        debug!(
            %verdict,
            elapsed_us = started.elapsed().as_micros() as u64,
            "solver check finished"
        );
        verdict
    }
}

fn encode<'ctx>(ctx: &'ctx Context, var: &Int<'ctx>, constraint: &Constraint) -> Bool<'ctx> {
    let literal = Int::from_i64(ctx, constraint.literal);
    match constraint.relation {
        Relation::Eq => var._eq(&literal),
        Relation::Gte => var.ge(&literal),
        Relation::Lte => var.le(&literal),
    }
}

/// Z3 takes the timeout as a `u32` of milliseconds
fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

fn unknown(reason: String) -> Verdict {
    debug!(%reason, "solver check unknown");
    Verdict::Unknown { reason }
}

// ── Tests ─────────────────────────────────────────────────
