//! ML analysis results.

use serde::{Deserialize, Serialize};

/// Risk level derived from the post-rule score.
///
/// A pure function of the adjusted score with fixed thresholds; the
/// configurable decision-matrix thresholds do not affect these bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band an adjusted score: `< 0.30` LOW, `< 0.60` MEDIUM, `< 0.85` HIGH,
    /// else CRITICAL.
    pub fn from_score(score: f64) -> Self {
        if score < 0.30 {
            RiskLevel::Low
        } else if score < 0.60 {
            RiskLevel::Medium
        } else if score < 0.85 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Uppercase identifier matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-model and combined scores, all in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    /// Tree-forest regressor output.
    pub random_forest: f64,
    /// Gradient-boosted regressor output.
    pub xgboost: f64,
    /// Weighted ensemble before hard validation rules.
    pub ensemble: f64,
    /// Final score after hard validation rules.
    pub adjusted: f64,
}

/// A single named feature importance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name from the kind's declared schema.
    pub name: String,
    /// Relative importance in [0, 1].
    pub importance: f64,
}

/// The scorer's full output for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlAnalysis {
    /// Post-rule fraud risk score in [0, 1].
    #[serde(rename = "fraud_risk_score")]
    pub score: f64,
    /// Risk band for the post-rule score.
    pub risk_level: RiskLevel,
    /// Model confidence in [0, 1], from per-model agreement and field quality.
    #[serde(rename = "model_confidence")]
    pub confidence: f64,
    /// Per-model and combined scores.
    pub model_scores: ModelScores,
    /// Top feature importances, highest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_importance: Vec<FeatureImportance>,
    /// Ordered anomaly descriptions, stable across runs.
    pub anomalies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.59), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.60), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.84), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.85), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_wire_names() {
        let analysis = MlAnalysis {
            score: 0.21,
            risk_level: RiskLevel::Low,
            confidence: 0.9,
            model_scores: ModelScores {
                random_forest: 0.2,
                xgboost: 0.22,
                ensemble: 0.21,
                adjusted: 0.21,
            },
            feature_importance: vec![],
            anomalies: vec![],
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["fraud_risk_score"], 0.21);
        assert_eq!(json["risk_level"], "LOW");
        assert_eq!(json["model_confidence"], 0.9);
        assert!(json.get("feature_importance").is_none());
    }
}
