//! Configuration for conclusion synthesis

use serde::{Deserialize, Serialize};

/// Settings for the conclusion synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Run synthesis at all
    pub enabled: bool,

    /// Maximum items kept per output list
    pub max_items: usize,

    /// Fewer conclusions than this are accepted with a warning
    pub min_items: usize,

    /// Summaries included in the prompt, in run order
    pub max_summaries: usize,

    /// Generation budget for the request
    pub max_tokens: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: 5,
            min_items: 3,
            max_summaries: 50,
            max_tokens: 4096,
        }
    }
}

impl SynthesisConfig {
    /// Configuration with synthesis switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_items == 0 {
            return Err("max_items must be greater than 0".to_string());
        }
        if self.min_items > self.max_items {
            return Err(format!(
                "min_items ({}) must not exceed max_items ({})",
                self.min_items, self.max_items
            ));
        }
        if self.max_summaries == 0 {
            return Err("max_summaries must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}
