//! Canonical normalizer — clause text to a deterministic comparison form
//!
//! Both the extractor and the compiler match keywords against the
//! normalized text, never the raw text.
//!
//! # Pipeline
//!
//! `raw text → lowercase → strip digit separators → collapse whitespace`
//!
//! The clause-set fingerprint hashes the canonical form of every clause in
//! submission order, so callers can key caches on it.
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize_text(normalize_text(x)) == normalize_text(x)`
//! - **Deterministic**: same input always produces same output

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::Clause;

// ── Public API ─────────────────────────────────────────────

/// Normalize clause text for keyword matching.
///
/// `"Liability  capped at $10,000"` becomes `"liability capped at $10000"`.
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let without_separators = digit_separator_re()
        .replace_all(&lower, |caps: &regex::Captures| caps[0].replace(',', ""));
    let collapsed = whitespace_re().replace_all(&without_separators, " ");
    collapsed.trim().to_string()
}

/// Canonical single-line form of a clause, used for hashing.
pub fn canonical_clause(clause: &Clause) -> String {
    let category = clause
        .category
        .map(|c| c.as_str().to_string())
        .unwrap_or_default();
    let value = clause.value.map(|v| v.to_string()).unwrap_or_default();
    format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}",
        clause.id,
        normalize_text(&clause.text),
        category,
        value
    )
}

// ── SHA-256 Fingerprint ───────────────────────────────────

/// Compute the SHA-256 fingerprint of an ordered clause set.
///
/// Order is significant: conflicts are reported by position.
pub fn fingerprint(clauses: &[Clause]) -> String {
    let mut hasher = Sha256::new();
    for clause in clauses {
        hasher.update(canonical_clause(clause).as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

// ── Helpers ────────────────────────────────────────────────

fn digit_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,3}(?:,\d{3})+\b").expect("valid separator pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

// ── Tests ─────────────────────────────────────────────────
