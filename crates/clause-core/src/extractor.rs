//! Proposition extractor — clause text to structured attributes
//!
//! Keyword and pattern heuristics only. Extraction is total: a clause that
//! matches nothing yields `Proposition::default()`.
//!
//! Day counts are located relative to an anchor word (`notice` for notice
//! periods, `before` for minimum terms). A count belongs to an anchor only
//! when the two are adjacent (`30 days notice`, `before 90 calendar days`),
//! and the gap between them must fit in the anchor window. Counts written
//! before the anchor are tried first; the first match wins.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalizer::normalize_text;

/// Default maximum number of characters between a day count and its anchor
pub const DEFAULT_ANCHOR_WINDOW: usize = 24;

const TERMINATION_KEYWORDS: &[&str] = &["terminate", "termination", "cancel", "end the agreement"];
const PROHIBITION_MARKERS: &[&str] = &[
    "may not",
    "cannot",
    "can not",
    "neither",
    "shall not",
    "must not",
];
const PERMISSION_MARKERS: &[&str] = &["may ", "can ", "allowed", "is entitled to"];

/// Party role recognized in clause text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Seller,
    Buyer,
    Vendor,
    Customer,
    Licensee,
    Licensor,
    Party,
    Company,
    Contractor,
}

impl Party {
    /// Map a vocabulary word (singular or plural) to its role
    pub fn from_word(word: &str) -> Option<Party> {
        let party = match word {
            "seller" | "sellers" => Party::Seller,
            "buyer" | "buyers" => Party::Buyer,
            "vendor" | "vendors" => Party::Vendor,
            "customer" | "customers" => Party::Customer,
            "licensee" | "licensees" => Party::Licensee,
            "licensor" | "licensors" => Party::Licensor,
            "party" | "parties" => Party::Party,
            "company" | "companies" => Party::Company,
            "contractor" | "contractors" => Party::Contractor,
            _ => return None,
        };
        Some(party)
    }
}

/// Structured attributes of one clause.
///
/// `None` / `false` means the pattern did not match, not that the clause
/// asserts the opposite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposition {
    pub can_terminate: bool,
    pub notice_days: Option<u32>,
    pub min_term_days: Option<u32>,
    pub is_exclusive: bool,
    pub is_prohibition: bool,
    pub is_permission: bool,
    /// Literal mention of "terminate" in the clause text
    pub mentions_terminate: bool,
    pub parties: BTreeSet<Party>,
}

impl Proposition {
    /// True when no attribute was extracted
    pub fn is_empty(&self) -> bool {
        *self == Proposition::default()
    }
}

/// Extract a proposition using the default anchor window
pub fn extract_proposition(text: &str) -> Proposition {
    extract_with_window(text, DEFAULT_ANCHOR_WINDOW)
}

/// Extract a proposition, allowing at most `window` characters between a
/// day count and its anchor word
pub fn extract_with_window(text: &str, window: usize) -> Proposition {
    let text = normalize_text(text);

    Proposition {
        can_terminate: contains_any(&text, TERMINATION_KEYWORDS),
        notice_days: extract_days(&text, notice_patterns(), window),
        min_term_days: extract_days(&text, before_patterns(), window),
        is_exclusive: has_exclusivity(&text),
        is_prohibition: contains_any(&text, PROHIBITION_MARKERS),
        is_permission: contains_any(&text, PERMISSION_MARKERS),
        mentions_terminate: text.contains("terminate"),
        parties: extract_parties(&text),
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

// ── Day counts ────────────────────────────────────────────

/// Find a day count attached to an anchor word.
///
/// The count must sit directly against the anchor, with only
/// `[calendar|business] day(s)` and whitespace in between, and that gap
/// may span at most `window` characters. Every "count before anchor" match
/// is tried before any "anchor before count" match.
fn extract_days(text: &str, patterns: &AnchorPatterns, window: usize) -> Option<u32> {
    let leading = patterns.leading.captures_iter(text).find_map(|caps| {
        let (count, anchor) = (caps.name("count")?, caps.name("anchor")?);
        within_window(&text[count.end()..anchor.start()], window)
            .then(|| count.as_str().parse::<u32>().ok())
            .flatten()
    });
    if leading.is_some() {
        return leading;
    }

    patterns.trailing.captures_iter(text).find_map(|caps| {
        let (anchor, count) = (caps.name("anchor")?, caps.name("count")?);
        within_window(&text[anchor.end()..count.start()], window)
            .then(|| count.as_str().parse::<u32>().ok())
            .flatten()
    })
}

fn within_window(gap: &str, window: usize) -> bool {
    gap.chars().count() <= window
}

// ── Exclusivity & parties ─────────────────────────────────

fn has_exclusivity(text: &str) -> bool {
    exclusivity_re().find_iter(text).any(|m| {
        let head = &text[..m.start()];
        !(head.ends_with("non-") || head.ends_with("non "))
    })
}

fn extract_parties(text: &str) -> BTreeSet<Party> {
    party_re()
        .find_iter(text)
        .filter_map(|m| Party::from_word(m.as_str()))
        .collect()
}

// ── Patterns ──────────────────────────────────────────────

/// Count-then-anchor and anchor-then-count forms of one anchor word
struct AnchorPatterns {
    leading: Regex,
    trailing: Regex,
}

impl AnchorPatterns {
    fn new(anchor: &str) -> Self {
        let days = r"\s*(?:calendar\s+|business\s+)?days?";
        Self {
            leading: Regex::new(&format!(r"\b(?P<count>\d+){days}\s*(?P<anchor>{anchor})\b"))
                .expect("valid leading day pattern"),
            trailing: Regex::new(&format!(r"\b(?P<anchor>{anchor})\s*(?P<count>\d+){days}\b"))
                .expect("valid trailing day pattern"),
        }
    }
}

fn notice_patterns() -> &'static AnchorPatterns {
    static PATTERNS: OnceLock<AnchorPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| AnchorPatterns::new("notice"))
}

fn before_patterns() -> &'static AnchorPatterns {
    static PATTERNS: OnceLock<AnchorPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| AnchorPatterns::new("before"))
}

fn exclusivity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:exclusive|exclusively|only)\b").expect("valid exclusivity pattern"))
}

fn party_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:sellers?|buyers?|vendors?|customers?|licensees?|licensors?|party|parties|company|companies|contractors?)\b",
        )
        .expect("valid party pattern")
    })
}
