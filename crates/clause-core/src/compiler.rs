//! Constraint compiler — categorized clauses to bounded-integer constraints
//!
//! Each DURATION or LIABILITY clause carries a caller-normalized value. The
//! clause text only decides the qualifier, which decides the relation:
//!
//! | Category  | Qualifier | Relation                          |
//! |-----------|-----------|-----------------------------------|
//! | DURATION  | Exact     | `contract_duration_months == v`   |
//! | DURATION  | Minimum   | `contract_duration_months >= v`   |
//! | DURATION  | Maximum   | `contract_duration_months <= v`   |
//! | LIABILITY | Cap       | `max_liability_usd <= v`          |
//! | LIABILITY | Penalty   | `max_liability_usd >= v`          |
//!
//! Validation runs over every clause before anything is compiled. A clause
//! whose qualifier cannot be classified is skipped and reported, not failed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::normalizer::normalize_text;
use crate::{Clause, ClauseCategory, Error, Result};

// ── Constraint Types ──────────────────────────────────────

/// Shared integer quantities constrained by clauses. Fixed at design time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintVariable {
    ContractDurationMonths,
    MaxLiabilityUsd,
    /// Declared and bounded in every solver context; no category compiles onto it yet
    NoticePeriodDays,
}

impl ConstraintVariable {
    pub const ALL: [ConstraintVariable; 3] = [
        ConstraintVariable::ContractDurationMonths,
        ConstraintVariable::MaxLiabilityUsd,
        ConstraintVariable::NoticePeriodDays,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintVariable::ContractDurationMonths => "contract_duration_months",
            ConstraintVariable::MaxLiabilityUsd => "max_liability_usd",
            ConstraintVariable::NoticePeriodDays => "notice_period_days",
        }
    }

    /// Variable a formal category constrains
    pub fn for_category(category: ClauseCategory) -> Option<ConstraintVariable> {
        match category {
            ClauseCategory::Duration => Some(ConstraintVariable::ContractDurationMonths),
            ClauseCategory::Liability => Some(ConstraintVariable::MaxLiabilityUsd),
            ClauseCategory::Other => None,
        }
    }
}

impl std::fmt::Display for ConstraintVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    Eq,
    Gte,
    Lte,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Relation::Eq => write!(f, "=="),
            Relation::Gte => write!(f, ">="),
            Relation::Lte => write!(f, "<="),
        }
    }
}

/// `variable relation literal`, tagged with the clause it came from.
///
/// Built-in domain bounds have no source clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub variable: ConstraintVariable,
    pub relation: Relation,
    pub literal: i64,
    pub source_clause_id: Option<String>,
}

impl Constraint {
    pub fn from_clause(
        variable: ConstraintVariable,
        relation: Relation,
        literal: i64,
        clause_id: &str,
    ) -> Self {
        Self {
            variable,
            relation,
            literal,
            source_clause_id: Some(clause_id.to_string()),
        }
    }

    pub fn builtin(variable: ConstraintVariable, relation: Relation, literal: i64) -> Self {
        Self {
            variable,
            relation,
            literal,
            source_clause_id: None,
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {}", self.variable, self.relation, self.literal)?;
        if let Some(ref id) = self.source_clause_id {
            write!(f, " [{}]", id)?;
        }
        Ok(())
    }
}

/// Natural-language qualifier recognized in a categorized clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Qualifier {
    Exact,
    Minimum,
    Maximum,
    Cap,
    Penalty,
}

impl Qualifier {
    pub fn relation(&self) -> Relation {
        match self {
            Qualifier::Exact => Relation::Eq,
            Qualifier::Minimum | Qualifier::Penalty => Relation::Gte,
            Qualifier::Maximum | Qualifier::Cap => Relation::Lte,
        }
    }
}

/// Clause left out of the constraint set because its qualifier is unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedClause {
    pub clause_id: String,
    pub category: ClauseCategory,
    pub reason: String,
}

/// Output of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledConstraints {
    pub constraints: Vec<Constraint>,
    pub skipped: Vec<SkippedClause>,
}

// ── Qualifier Tables ──────────────────────────────────────

const DURATION_QUALIFIERS: &[(Qualifier, &[&str])] = &[
    (Qualifier::Exact, &["exactly", "fixed term of"]),
    (
        Qualifier::Minimum,
        &["minimum", "at least", "no less than", "not less than"],
    ),
    (
        Qualifier::Maximum,
        &["maximum", "up to", "no more than", "not exceed", "not to exceed"],
    ),
];

const LIABILITY_QUALIFIERS: &[(Qualifier, &[&str])] = &[
    (
        Qualifier::Cap,
        &[
            "capped",
            "cap",
            "max",
            "maximum",
            "limited to",
            "not exceed",
            "not to exceed",
        ],
    ),
    (
        Qualifier::Penalty,
        &["penalty", "penalties", "fixed", "liquidated damages"],
    ),
];

// ── Public API ────────────────────────────────────────────

/// Classify the qualifier of a clause, first table hit wins.
///
/// Returns `None` for `Other` and for text with no recognized keyword.
pub fn classify_qualifier(category: ClauseCategory, text: &str) -> Option<Qualifier> {
    let table = match category {
        ClauseCategory::Duration => DURATION_QUALIFIERS,
        ClauseCategory::Liability => LIABILITY_QUALIFIERS,
        ClauseCategory::Other => return None,
    };
    let text = normalize_text(text);
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| has_phrase(&text, k)))
        .map(|(q, _)| *q)
}

/// Reject clauses the formal path cannot use. Runs before compilation.
///
/// Values must lie in the solver domain `[0, max_value]`. `Other` clauses
/// are not checked: the formal path ignores them.
pub fn validate_formal_clauses(clauses: &[&Clause], max_value: i64) -> Result<()> {
    for clause in clauses {
        let category = clause.category.ok_or_else(|| Error::InvalidClause {
            clause_id: clause.id.clone(),
            reason: "missing category".to_string(),
        })?;
        if !category.is_formal() {
            continue;
        }
        match clause.value {
            None => {
                return Err(Error::InvalidClause {
                    clause_id: clause.id.clone(),
                    reason: format!("{} clause has no value", category),
                })
            }
            Some(v) if v < 0 => {
                return Err(Error::InvalidClause {
                    clause_id: clause.id.clone(),
                    reason: format!("value must be non-negative, found {}", v),
                })
            }
            Some(v) if v > max_value => {
                return Err(Error::InvalidClause {
                    clause_id: clause.id.clone(),
                    reason: format!("value {} exceeds the maximum of {}", v, max_value),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Validate, then compile every formal clause into at most one constraint.
pub fn compile(clauses: &[&Clause], max_value: i64) -> Result<CompiledConstraints> {
    validate_formal_clauses(clauses, max_value)?;

    let mut compiled = CompiledConstraints::default();

    for clause in clauses {
        // Validation guarantees category and value for formal clauses
        let (Some(category), Some(value)) = (clause.category, clause.value) else {
            continue;
        };
        let Some(variable) = ConstraintVariable::for_category(category) else {
            continue;
        };

        match classify_qualifier(category, &clause.text) {
            Some(qualifier) => {
                let constraint =
                    Constraint::from_clause(variable, qualifier.relation(), value, &clause.id);
                debug!(clause = %clause.id, %constraint, "compiled clause");
                compiled.constraints.push(constraint);
            }
            None => {
                warn!(clause = %clause.id, %category, "no recognized qualifier; clause skipped");
                compiled.skipped.push(SkippedClause {
                    clause_id: clause.id.clone(),
                    category,
                    reason: format!("no recognized {} qualifier", category),
                });
            }
        }
    }

    Ok(compiled)
}

// ── Helpers ───────────────────────────────────────────────

/// Phrase occurs in text on word boundaries
fn has_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, m)| {
        let before = text[..start].chars().next_back();
        let after = text[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

// ── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: i64 = 1_000_000_000;

    fn duration(id: &str, text: &str, value: i64) -> Clause {
        Clause::categorized(id, text, ClauseCategory::Duration, value)
    }

    fn liability(id: &str, text: &str, value: i64) -> Clause {
        Clause::categorized(id, text, ClauseCategory::Liability, value)
    }

    #[test]
    fn test_duration_qualifiers() {
        let d = ClauseCategory::Duration;
        assert_eq!(classify_qualifier(d, "Term is exactly 12 months"), Some(Qualifier::Exact));
        assert_eq!(classify_qualifier(d, "Minimum term 24 months"), Some(Qualifier::Minimum));
        assert_eq!(classify_qualifier(d, "At least 6 months"), Some(Qualifier::Minimum));
        assert_eq!(classify_qualifier(d, "Maximum 36 months"), Some(Qualifier::Maximum));
        assert_eq!(classify_qualifier(d, "Up to 48 months"), Some(Qualifier::Maximum));
        assert_eq!(classify_qualifier(d, "Renews annually"), None);
    }

    #[test]
    fn test_liability_qualifiers() {
        let l = ClauseCategory::Liability;
        assert_eq!(classify_qualifier(l, "Liability capped at $10,000"), Some(Qualifier::Cap));
        assert_eq!(classify_qualifier(l, "Max liability 5000"), Some(Qualifier::Cap));
        assert_eq!(classify_qualifier(l, "Penalty shall be 50000"), Some(Qualifier::Penalty));
        assert_eq!(classify_qualifier(l, "A fixed fee of 100"), Some(Qualifier::Penalty));
        assert_eq!(classify_qualifier(l, "Liability for gross negligence"), None);
    }

    #[test]
    fn test_cap_checked_before_penalty() {
        assert_eq!(
            classify_qualifier(ClauseCategory::Liability, "Penalty capped at 1000"),
            Some(Qualifier::Cap)
        );
    }

    #[test]
    fn test_keywords_match_whole_words() {
        // "capital" and "exactly-ish" variants must not trigger
        assert_eq!(
            classify_qualifier(ClauseCategory::Liability, "Capital adequacy is required"),
            None
        );
        assert_eq!(
            classify_qualifier(ClauseCategory::Duration, "Inexactly specified term"),
            None
        );
    }

    #[test]
    fn test_other_category_never_classifies() {
        assert_eq!(classify_qualifier(ClauseCategory::Other, "exactly 12 months"), None);
    }

    #[test]
    fn test_compile_relations() {
        let clauses = [
            duration("d1", "exactly 12 months", 12),
            duration("d2", "at least 6 months", 6),
            liability("l1", "capped at 20000", 20000),
            liability("l2", "penalty of 5000", 5000),
        ];
        let refs: Vec<&Clause> = clauses.iter().collect();
        let compiled = compile(&refs, MAX).unwrap();
        assert!(compiled.skipped.is_empty());
        assert_eq!(
            compiled.constraints,
            vec![
                Constraint::from_clause(ConstraintVariable::ContractDurationMonths, Relation::Eq, 12, "d1"),
                Constraint::from_clause(ConstraintVariable::ContractDurationMonths, Relation::Gte, 6, "d2"),
                Constraint::from_clause(ConstraintVariable::MaxLiabilityUsd, Relation::Lte, 20000, "l1"),
                Constraint::from_clause(ConstraintVariable::MaxLiabilityUsd, Relation::Gte, 5000, "l2"),
            ]
        );
    }

    #[test]
    fn test_unrecognized_qualifier_is_soft_skip() {
        let clauses = [
            duration("d1", "The term renews annually", 12),
            duration("d2", "exactly 12 months", 12),
        ];
        let refs: Vec<&Clause> = clauses.iter().collect();
        let compiled = compile(&refs, MAX).unwrap();
        assert_eq!(compiled.constraints.len(), 1);
        assert_eq!(compiled.skipped.len(), 1);
        assert_eq!(compiled.skipped[0].clause_id, "d1");
        assert_eq!(compiled.skipped[0].category, ClauseCategory::Duration);
    }

    #[test]
    fn test_missing_value_is_hard_failure() {
        let clause = Clause::new("d1", "exactly", Some(ClauseCategory::Duration), None);
        let err = compile(&[&clause], MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidClause { ref clause_id, .. } if clause_id == "d1"));
    }

    #[test]
    fn test_missing_category_is_hard_failure() {
        let clause = Clause::new("x", "exactly", None, Some(12));
        let err = compile(&[&clause], MAX).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidClause {
                clause_id: "x".into(),
                reason: "missing category".into()
            }
        );
    }

    #[test]
    fn test_negative_value_is_hard_failure() {
        let clause = liability("l1", "capped at", -5);
        assert!(matches!(
            compile(&[&clause], MAX),
            Err(Error::InvalidClause { .. })
        ));
    }

    #[test]
    fn test_value_above_domain_is_hard_failure() {
        let clause = duration("d1", "exactly", MAX + 1);
        let err = compile(&[&clause], MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidClause { ref reason, .. } if reason.contains("exceeds")));
    }

    #[test]
    fn test_validation_runs_before_compilation() {
        // The second clause is invalid; nothing from the first is returned
        let good = duration("d1", "exactly 12 months", 12);
        let bad = Clause::new("d2", "at least", Some(ClauseCategory::Duration), None);
        assert!(compile(&[&good, &bad], MAX).is_err());
    }

    #[test]
    fn test_other_clauses_are_ignored() {
        let other = Clause::new("o1", "Governing law is Delaware", Some(ClauseCategory::Other), None);
        let compiled = compile(&[&other], MAX).unwrap();
        assert!(compiled.constraints.is_empty());
        assert!(compiled.skipped.is_empty());
    }

    #[test]
    fn test_constraint_display() {
        let c = Constraint::from_clause(ConstraintVariable::MaxLiabilityUsd, Relation::Lte, 10000, "l1");
        assert_eq!(c.to_string(), "max_liability_usd <= 10000 [l1]");
        let b = Constraint::builtin(ConstraintVariable::NoticePeriodDays, Relation::Gte, 0);
        assert_eq!(b.to_string(), "notice_period_days >= 0");
    }
}
