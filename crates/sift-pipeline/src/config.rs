//! Aggregated pipeline configuration
//!
//! Every section is optional in the TOML file; missing sections and fields
//! take their defaults.
//!
//! ```toml
//! [batch]
//! batch_size = 20
//! concurrency = 3
//!
//! [graph]
//! max_documents = 50
//!
//! [primary]
//! kind = "anthropic"
//! model = "claude-sonnet-4-5"
//!
//! [fallback]
//! kind = "openai"
//! model = "gpt-4o-mini"
//! ```

use serde::{Deserialize, Serialize};
use sift_analysis::{ClusterConfig, FactThresholds, GraphTrigger};
use sift_batcher::BatchConfig;
use sift_llm::ProviderConfig;
use sift_synthesizer::SynthesisConfig;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Partitioning, summarization and scheduling
    pub batch: BatchConfig,

    /// Fact category thresholds
    pub facts: FactThresholds,

    /// When to build the knowledge graph
    pub graph: GraphTrigger,

    /// Clustering parameters
    pub cluster: ClusterConfig,

    /// Conclusion synthesis
    pub synthesis: SynthesisConfig,

    /// Provider tried first
    pub primary: ProviderConfig,

    /// Provider tried when the primary fails
    pub fallback: Option<ProviderConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            facts: FactThresholds::default(),
            graph: GraphTrigger::default(),
            cluster: ClusterConfig::default(),
            synthesis: SynthesisConfig::default(),
            primary: ProviderConfig::anthropic(),
            fallback: Some(ProviderConfig::openai()),
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections: [(&str, Result<(), String>); 6] = [
            ("batch", self.batch.validate()),
            ("facts", self.facts.validate()),
            ("graph", self.graph.validate()),
            ("cluster", self.cluster.validate()),
            ("synthesis", self.synthesis.validate()),
            ("primary", self.primary.validate()),
        ];
        for (section, result) in sections {
            result.map_err(|e| ConfigError::Invalid(format!("[{}] {}", section, e)))?;
        }
        if let Some(fallback) = &self.fallback {
            fallback
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("[fallback] {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_llm::ProviderKind;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.batch_size, 20);
        assert_eq!(config.primary.kind, ProviderKind::Anthropic);
        assert_eq!(config.fallback.map(|f| f.kind), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [batch]
            concurrency = 5

            [synthesis]
            enabled = false

            [primary]
            kind = "ollama"
            model = "llama3.2"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch.concurrency, 5);
        assert_eq!(config.batch.batch_size, 20);
        assert!(!config.synthesis.enabled);
        assert_eq!(config.primary.kind, ProviderKind::Ollama);
        assert_eq!(config.graph, GraphTrigger::default());
    }

    #[test]
    fn test_invalid_section_is_named() {
        let err = PipelineConfig::from_toml("[batch]\nbatch_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("[batch]"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PipelineConfig::default();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[facts]\ncommon_min_frequency = 2").unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.facts.common_min_frequency, 2);

        assert!(matches!(
            PipelineConfig::from_file("/nonexistent/sift.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }
}
