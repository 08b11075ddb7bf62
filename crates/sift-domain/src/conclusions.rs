//! Cross-document conclusions

use serde::{Deserialize, Serialize};

/// Strategic conclusions synthesized from a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conclusions {
    /// High-level conclusions, most important first
    pub conclusions: Vec<String>,

    /// Actionable recommendations
    pub recommendations: Vec<String>,

    /// Evidence strings backing the conclusions
    pub evidence: Vec<String>,

    /// Aggregate confidence in [0, 1]
    pub confidence: f64,
}

impl Conclusions {
    /// The degraded result used when synthesis fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when nothing was synthesized
    pub fn is_empty(&self) -> bool {
        self.conclusions.is_empty() && self.recommendations.is_empty() && self.evidence.is_empty()
    }
}
