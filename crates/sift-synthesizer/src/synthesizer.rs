//! Cross-document conclusion synthesis

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::parser::parse_conclusions;
use crate::prompt::{build_request, SynthesisInput};
use sift_domain::Conclusions;
use sift_llm::ProviderChain;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns a finished run into strategic conclusions with one provider call
pub struct ConclusionSynthesizer {
    chain: Arc<ProviderChain>,
    config: SynthesisConfig,
}

impl ConclusionSynthesizer {
    /// Create a synthesizer sharing the run's provider chain
    pub fn new(chain: Arc<ProviderChain>, config: SynthesisConfig) -> Self {
        Self { chain, config }
    }

    /// Current configuration
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize conclusions; any failure yields [`Conclusions::empty`]
    pub async fn synthesize(&self, input: &SynthesisInput<'_>) -> Conclusions {
        match self.try_synthesize(input).await {
            Ok(conclusions) => conclusions,
            Err(SynthesisError::Disabled) => {
                debug!("Conclusion synthesis disabled");
                Conclusions::empty()
            }
            Err(e) => {
                warn!(error = %e, "Conclusion synthesis failed, continuing without conclusions");
                Conclusions::empty()
            }
        }
    }

    /// Synthesize conclusions, surfacing the failure cause
    pub async fn try_synthesize(
        &self,
        input: &SynthesisInput<'_>,
    ) -> Result<Conclusions, SynthesisError> {
        if !self.config.enabled {
            return Err(SynthesisError::Disabled);
        }
        if input.summaries.is_empty() {
            return Err(SynthesisError::NoInput);
        }

        let request = build_request(
            input,
            self.config.max_items,
            self.config.max_summaries,
            self.config.max_tokens,
        );
        debug!(prompt_chars = request.prompt.len(), "Sending synthesis request");

        let routed = self
            .chain
            .complete_with(&request, |completion| parse_conclusions(&completion.text))
            .await?;
        let raw = routed.value;

        let confidence = match raw.confidence {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => input.mean_confidence(),
        };

        let limit = self.config.max_items;
        let conclusions = Conclusions {
            conclusions: raw.conclusions.into_iter().take(limit).collect(),
            recommendations: raw.recommendations.into_iter().take(limit).collect(),
            evidence: raw.evidence.into_iter().take(limit).collect(),
            confidence,
        };

        if conclusions.conclusions.len() < self.config.min_items {
            warn!(
                conclusions = conclusions.conclusions.len(),
                expected = self.config.min_items,
                "Provider returned fewer conclusions than expected"
            );
        }

        info!(
            provider = %routed.provider,
            conclusions = conclusions.conclusions.len(),
            recommendations = conclusions.recommendations.len(),
            confidence = conclusions.confidence,
            "Conclusions synthesized"
        );

        Ok(conclusions)
    }
}
