//! Response parsing for decision synthesis.

use serde::Deserialize;

use docguard_core::Decision;

use crate::error::{LlmError, LlmResult};

/// The JSON shape the model is required to emit.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReply {
    pub recommendation: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub key_indicators: Vec<String>,
    #[serde(default)]
    pub actionable_recommendations: Vec<String>,
}

impl RawReply {
    /// The recommendation as a decision, if it names one.
    pub fn decision(&self) -> Option<Decision> {
        match self.recommendation.trim().to_uppercase().as_str() {
            "APPROVE" => Some(Decision::Approve),
            "ESCALATE" => Some(Decision::Escalate),
            "REJECT" => Some(Decision::Reject),
            _ => None,
        }
    }

    /// Confidence clamped into [0, 1].
    pub fn clamped_confidence(&self) -> f64 {
        if self.confidence_score.is_finite() {
            self.confidence_score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Parse a model response, tolerating fenced code blocks and surrounding
/// prose around the JSON object.
pub fn parse_reply(text: &str) -> LlmResult<RawReply> {
    let candidate = extract_json(text).ok_or_else(|| {
        LlmError::Parse("response contains no JSON object".to_string())
    })?;
    serde_json::from_str(candidate).map_err(|e| LlmError::Parse(e.to_string()))
}

/// Locate the JSON object within a response: the content of a ```json
/// fence when present, otherwise the outermost brace span.
fn extract_json(text: &str) -> Option<&str> {
    let fenced = text
        .split("```")
        .nth(1)
        .map(|block| block.strip_prefix("json").unwrap_or(block));
    let candidate = match fenced {
        Some(block) if block.contains('{') => block,
        _ => text,
    };
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    (end > start).then(|| &candidate[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "recommendation": "escalate",
        "confidence_score": 0.82,
        "summary": "Score is in the escalation band.",
        "reasoning": ["step one", "step two"],
        "key_indicators": ["balance mismatch"],
        "actionable_recommendations": ["request original statement"]
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let reply = parse_reply(VALID).unwrap();
        assert_eq!(reply.decision(), Some(Decision::Escalate));
        assert_eq!(reply.reasoning.len(), 2);
        assert_eq!(reply.clamped_confidence(), 0.82);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = format!("Here is my analysis:\n```json\n{VALID}\n```\nDone.");
        let reply = parse_reply(&text).unwrap();
        assert_eq!(reply.decision(), Some(Decision::Escalate));
    }

    #[test]
    fn test_parse_json_with_prose_around_it() {
        let text = format!("Sure! {VALID} Let me know if you need more.");
        assert!(parse_reply(&text).is_ok());
    }

    #[test]
    fn test_unknown_recommendation_maps_to_none() {
        let reply = parse_reply(r#"{"recommendation": "MAYBE"}"#).unwrap();
        assert_eq!(reply.decision(), None);
    }

    #[test]
    fn test_missing_json_is_parse_error() {
        assert!(matches!(
            parse_reply("I cannot help with that."),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_non_finite_confidence_clamped() {
        let reply = parse_reply(r#"{"recommendation": "APPROVE", "confidence_score": 1e999}"#);
        // 1e999 parses as infinity in serde_json's f64 handling or fails;
        // either way the reply never leaks a non-finite confidence.
        if let Ok(reply) = reply {
            assert!(reply.clamped_confidence().is_finite());
        }
    }
}
