//! Parse the provider's conclusions response

use serde::Deserialize;

/// Conclusions as the provider stated them, before bounding
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawConclusions {
    /// Stated conclusions
    #[serde(default)]
    pub conclusions: Vec<String>,

    /// Stated recommendations
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Stated evidence
    #[serde(default)]
    pub evidence: Vec<String>,

    /// Provider-stated confidence, if any
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Parse a conclusions object out of a response
///
/// Tolerates code fences and prose around the object. A response with no
/// items at all is rejected so the chain moves on to the fallback.
pub fn parse_conclusions(response: &str) -> Result<RawConclusions, String> {
    let start = response.find('{').ok_or("No JSON object in response")?;
    let end = response.rfind('}').ok_or("No JSON object in response")?;
    if end < start {
        return Err("No JSON object in response".to_string());
    }

    let mut raw: RawConclusions = serde_json::from_str(&response[start..=end])
        .map_err(|e| format!("JSON parse error: {}", e))?;

    for list in [&mut raw.conclusions, &mut raw.recommendations, &mut raw.evidence] {
        list.retain(|item| !item.trim().is_empty());
    }
    if raw.conclusions.is_empty() && raw.recommendations.is_empty() && raw.evidence.is_empty() {
        return Err("Response contains no conclusions".to_string());
    }
    Ok(raw)
}
