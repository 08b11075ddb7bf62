//! Configuration for batching and summarization

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the partitioner, gateway and scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum documents per batch
    pub batch_size: usize,

    /// Maximum batches summarized at the same time
    pub concurrency: usize,

    /// Maximum time for a single provider call (seconds)
    pub timeout_secs: u64,

    /// Per-document character cap inside a batch prompt
    pub max_document_chars: usize,
}

impl BatchConfig {
    /// Get the per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            batch_size: 20,
            concurrency: 3,
            timeout_secs: 120,
            max_document_chars: 8_000,
        }
    }
}

impl BatchConfig {
    /// Aggressive preset: small batches, more parallelism, short timeouts
    pub fn aggressive() -> Self {
        Self {
            batch_size: 10,
            concurrency: 6,
            timeout_secs: 60,
            max_document_chars: 4_000,
        }
    }

    /// Lenient preset: large batches, low parallelism, long timeouts
    pub fn lenient() -> Self {
        Self {
            batch_size: 30,
            concurrency: 2,
            timeout_secs: 300,
            max_document_chars: 16_000,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(BatchConfig::aggressive().validate().is_ok());
        assert!(BatchConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_batch_size() {
        let mut config = BatchConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = BatchConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BatchConfig::from_toml("batch_size = 5").unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.concurrency, 3);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BatchConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        let parsed = BatchConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
