//! Clause Core - consistency verification for contract clauses
//!
//! Checks whether the clauses of one contract can all hold at the same time.
//! Two independent strategies share a single entry point:
//!
//! # Architecture
//!
//! ```text
//! free-text clauses    → Extractor → Propositions → Detector → Conflicts ──┐
//!                                                                          ├→ Report
//! categorized clauses  → Compiler  → Constraints  → Solver   → Verdict  ───┘
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same input always produces identical output
//! - **Stateless**: Every call builds its own solver context; nothing leaks
//!   between calls on a reused [`verifier::Verifier`]
//! - **Bounded**: Solver checks run under a wall-clock timeout
//! - **Total extraction**: Unmatched text yields empty propositions, never errors

pub mod compiler;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod report;
pub mod solver;
pub mod verifier;

use std::str::FromStr;

pub use config::VerifierConfig;
pub use error::{Error, Result};
pub use report::{ConflictRecord, ConsistencyReport};
pub use verifier::{Strategy, Verifier};

/// Category assigned to a clause by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClauseCategory {
    Duration,
    Liability,
    Other,
}

impl ClauseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseCategory::Duration => "DURATION",
            ClauseCategory::Liability => "LIABILITY",
            ClauseCategory::Other => "OTHER",
        }
    }

    /// Whether clauses of this category feed the formal strategy
    pub fn is_formal(&self) -> bool {
        matches!(self, ClauseCategory::Duration | ClauseCategory::Liability)
    }
}

impl std::fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DURATION" => Ok(ClauseCategory::Duration),
            "LIABILITY" => Ok(ClauseCategory::Liability),
            "OTHER" => Ok(ClauseCategory::Other),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// An atomic contractual provision, identified and ordered.
///
/// `category` and `value` are only required on the formal path; free-text
/// clauses leave both empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Clause {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub category: Option<ClauseCategory>,
    #[serde(default)]
    pub value: Option<i64>,
}

impl Clause {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: Option<ClauseCategory>,
        value: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category,
            value,
        }
    }

    /// Free-text clause for the heuristic strategy
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, text, None, None)
    }

    /// Categorized clause with a caller-normalized value
    pub fn categorized(
        id: impl Into<String>,
        text: impl Into<String>,
        category: ClauseCategory,
        value: i64,
    ) -> Self {
        Self::new(id, text, Some(category), Some(value))
    }

    /// Wrap plain strings as clauses with positional ids (`clause-1`, ...)
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<Clause> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Clause::text(format!("clause-{}", i + 1), t.as_ref()))
            .collect()
    }

    /// Deserialize a JSON array of clause records
    pub fn list_from_json(json: &str) -> Result<Vec<Clause>> {
        Ok(serde_json::from_str(json)?)
    }
}
