//! Configuration of the benchmarking harness

use crate::constants::DEFAULT_BSR_BLOCK;
use crate::error::{BenchError, Result};
use crate::matrix::StorageFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when an operation fails during a `full` run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failure; nothing is reported
    #[default]
    Abort,
    /// Log the failure, skip that operation and carry on
    Continue,
}

/// Configuration passed to the runner at construction
///
/// Every field has a default, so a configuration file only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Formats `--format all` expands to, in run order
    pub formats: Vec<StorageFormat>,

    /// Preferred block height and width of BSR matrices
    pub bsr_block: usize,

    pub failure_policy: FailurePolicy,

    /// Seed of the index RNG; `None` draws from system entropy
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            formats: StorageFormat::ALL.to_vec(),
            bsr_block: DEFAULT_BSR_BLOCK,
            failure_policy: FailurePolicy::Abort,
            seed: None,
        }
    }
}

impl HarnessConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HarnessConfig = serde_json::from_str(json)
            .map_err(|e| BenchError::Config(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.formats.is_empty() {
            return Err(BenchError::Config("at least one format is required".into()));
        }
        if self.bsr_block == 0 {
            return Err(BenchError::Config("bsr_block must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.formats.len(), 7);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            HarnessConfig::from_json(r#"{"formats": ["csr", "dok"], "failure_policy": "continue"}"#)
                .unwrap();
        assert_eq!(config.formats, vec![StorageFormat::Csr, StorageFormat::Dok]);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.bsr_block, DEFAULT_BSR_BLOCK);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(matches!(
            HarnessConfig::from_json(r#"{"formats": []}"#),
            Err(BenchError::Config(_))
        ));
        assert!(matches!(
            HarnessConfig::from_json(r#"{"bsr_block": 0}"#),
            Err(BenchError::Config(_))
        ));
        assert!(matches!(
            HarnessConfig::from_json(r#"{"formats": ["ell"]}"#),
            Err(BenchError::Config(_))
        ));
    }
}
