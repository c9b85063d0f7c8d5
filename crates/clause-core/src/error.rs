//! Error types for clause verification
//!
//! All fallible operations return `Result<T, Error>`.
//! Only hard failures live here: extraction is total, unclassifiable
//! qualifiers are soft skips, and solver exhaustion is an `Unknown` verdict.

use thiserror::Error;

/// Clause verification error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Clause submitted to the formal path is missing or has malformed fields
    #[error("invalid clause '{clause_id}': {reason}")]
    InvalidClause { clause_id: String, reason: String },

    /// Two clauses in one call share an id
    #[error("duplicate clause id '{0}'")]
    DuplicateClauseId(String),

    /// Category name is not DURATION, LIABILITY or OTHER
    #[error("unknown clause category '{0}'")]
    InvalidCategory(String),

    /// Verifier configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias for clause verification
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_clause_display() {
        let err = Error::InvalidClause {
            clause_id: "c1".into(),
            reason: "missing value".into(),
        };
        assert_eq!(err.to_string(), "invalid clause 'c1': missing value");
    }

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
