//! Verifier configuration
//!
//! Resource limits for the satisfiability engine plus the extractor's
//! search window. Every field has a default, so a partial JSON document
//! (or `{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Limits and tuning knobs shared by every verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Wall-clock budget for one solver check, in milliseconds.
    /// Zero means the check is abandoned immediately with an `Unknown` verdict.
    pub solver_timeout_ms: u64,
    /// Inclusive upper bound of every constraint variable's domain.
    pub max_domain_value: i64,
    /// Maximum number of characters between a day count and its anchor word.
    pub anchor_window_chars: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            solver_timeout_ms: 1000,
            max_domain_value: i64::MAX / 2,
            anchor_window_chars: 24,
        }
    }
}

impl VerifierConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: VerifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style timeout override
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.solver_timeout_ms = ms;
        self
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_domain_value <= 0 {
            return Err(Error::Config(format!(
                "max_domain_value must be positive, found {}",
                self.max_domain_value
            )));
        }
        if self.anchor_window_chars == 0 {
            return Err(Error::Config(
                "anchor_window_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
