//! The fraud scorer: scale, predict, ensemble, apply rules.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use docguard_core::{
    DocumentKind, FeatureImportance, FeatureVector, MlAnalysis, ModelScores, RiskLevel,
};

use crate::artifacts::KindModels;
use crate::error::{ScoringError, ScoringResult};
use crate::rules::apply_hard_rules;

/// Per-kind ensemble weights `(forest, boosted)`.
///
/// Declared constants; the boosted regressor carries more weight for the
/// document kinds with richer transaction signal.
pub fn ensemble_weights(kind: DocumentKind) -> (f64, f64) {
    match kind {
        DocumentKind::BankStatement | DocumentKind::Check => (0.4, 0.6),
        DocumentKind::Paystub | DocumentKind::MoneyOrder => (0.5, 0.5),
    }
}

/// Number of feature importances reported on an analysis.
const TOP_IMPORTANCES: usize = 5;

enum ScorerMode {
    /// Production path: persisted scaler and regressors per kind.
    Artifacts(HashMap<DocumentKind, KindModels>),
    /// Deterministic heuristic for tests and artifact-free environments.
    /// Only reachable through [`FraudScorer::mock`].
    Mock,
}

/// Maps feature vectors to [`MlAnalysis`] results.
///
/// Owns the loaded model artifacts; construction fails fast when any
/// required artifact is missing or invalid.
pub struct FraudScorer {
    mode: ScorerMode,
}

impl FraudScorer {
    /// Load artifacts for the given kinds from `model_dir`.
    pub fn from_artifacts(model_dir: &Path, kinds: &[DocumentKind]) -> ScoringResult<Self> {
        let mut models = HashMap::new();
        for &kind in kinds {
            let loaded = KindModels::load(model_dir, kind)?;
            info!(%kind, trees = loaded.forest.trees.len(), "loaded model artifacts");
            models.insert(kind, loaded);
        }
        Ok(Self {
            mode: ScorerMode::Artifacts(models),
        })
    }

    /// Construct the scorer in mock mode. The heuristic is documented and
    /// deterministic; it exists for tests and environments without
    /// artifacts and is never selected implicitly.
    pub fn mock() -> Self {
        Self {
            mode: ScorerMode::Mock,
        }
    }

    /// Whether this scorer was explicitly constructed in mock mode.
    pub fn is_mock(&self) -> bool {
        matches!(self.mode, ScorerMode::Mock)
    }

    /// Score a feature vector.
    pub fn score(&self, features: &FeatureVector) -> ScoringResult<MlAnalysis> {
        let kind = features.kind();
        let (forest_score, boosted_score, importances) = match &self.mode {
            ScorerMode::Artifacts(models) => {
                let models = models
                    .get(&kind)
                    .ok_or(ScoringError::KindNotLoaded { kind })?;
                if features.len() != models.scaler.feature_count {
                    return Err(ScoringError::DimensionMismatch {
                        kind,
                        expected: models.scaler.feature_count,
                        actual: features.len(),
                    });
                }
                let scaled = models.scaler.transform(features.values());
                let forest = normalize_prediction(models.forest.predict(&scaled));
                let boosted = normalize_prediction(models.boosted.predict(&scaled));
                let importances = trained_importances(features, &models.forest.feature_importances);
                (forest, boosted, importances)
            }
            ScorerMode::Mock => {
                let heuristic = mock_heuristic(features);
                let forest = (heuristic * 0.95 + 0.01).clamp(0.0, 1.0);
                let boosted = (heuristic * 1.05).clamp(0.0, 1.0);
                (forest, boosted, deviation_importances(features))
            }
        };

        if !forest_score.is_finite() || !boosted_score.is_finite() {
            return Err(ScoringError::NonFiniteScore { kind });
        }

        let (forest_weight, boosted_weight) = ensemble_weights(kind);
        let ensemble = forest_weight * forest_score + boosted_weight * boosted_score;

        let outcome = apply_hard_rules(ensemble, features);
        let risk_level = RiskLevel::from_score(outcome.adjusted);
        let confidence = model_confidence(forest_score, boosted_score, features);

        debug!(
            %kind,
            ensemble,
            adjusted = outcome.adjusted,
            %risk_level,
            anomaly_count = outcome.anomalies.len(),
            "scored document"
        );

        Ok(MlAnalysis {
            score: outcome.adjusted,
            risk_level,
            confidence,
            model_scores: ModelScores {
                random_forest: forest_score,
                xgboost: boosted_score,
                ensemble,
                adjusted: outcome.adjusted,
            },
            feature_importance: importances,
            anomalies: outcome.anomalies,
        })
    }
}

/// Regressors emit on a 0..100 risk scale; normalize into [0, 1].
fn normalize_prediction(raw: f64) -> f64 {
    (raw / 100.0).clamp(0.0, 1.0)
}

/// Confidence from per-model agreement, discounted by field quality:
/// `(1 - |s_A - s_B|) * (0.6 + 0.4 * field_quality)`, clamped to [0, 1].
fn model_confidence(forest: f64, boosted: f64, features: &FeatureVector) -> f64 {
    let agreement = 1.0 - (forest - boosted).abs();
    let field_quality = features.get("field_quality").unwrap_or(0.5);
    (agreement * (0.6 + 0.4 * field_quality)).clamp(0.0, 1.0)
}

/// Top trained importances, aligned to schema order.
fn trained_importances(features: &FeatureVector, importances: &[f64]) -> Vec<FeatureImportance> {
    if importances.len() != features.len() {
        return Vec::new();
    }
    let mut ranked: Vec<FeatureImportance> = features
        .schema()
        .specs()
        .iter()
        .zip(importances)
        .filter(|(_, imp)| **imp > 0.0)
        .map(|(spec, imp)| FeatureImportance {
            name: spec.name.to_string(),
            importance: *imp,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(TOP_IMPORTANCES);
    ranked
}

/// Mock-mode importances: normalized deviation from each feature's default.
fn deviation_importances(features: &FeatureVector) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = features
        .schema()
        .specs()
        .iter()
        .zip(features.values())
        .filter(|(spec, _)| spec.max > spec.min)
        .map(|(spec, value)| FeatureImportance {
            name: spec.name.to_string(),
            importance: (value - spec.default).abs() / (spec.max - spec.min),
        })
        .filter(|fi| fi.importance > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(TOP_IMPORTANCES);
    ranked
}

/// The documented mock heuristic: a weighted sum over quality and
/// consistency features. Deterministic by construction.
fn mock_heuristic(features: &FeatureVector) -> f64 {
    let mut score = 0.05;
    if let Some(text_quality) = features.get("text_quality") {
        score += 0.10 * (1.0 - text_quality);
    }
    if let Some(field_quality) = features.get("field_quality") {
        score += 0.25 * (1.0 - field_quality);
    }
    if let Some(balance) = features.get("balance_consistency") {
        score += 0.28 * (1.0 - balance);
    }
    if let Some(written) = features.get("written_amount_consistency") {
        score += 0.20 * (1.0 - written).max(0.0) * features.get("has_amount_written").unwrap_or(0.0);
    }
    if let Some(ratio) = features.get("round_amount_ratio") {
        score += 0.10 * ratio;
    }
    if features
        .get("duplicate_transaction_count")
        .map(|v| v > 0.0)
        .unwrap_or(false)
    {
        score += 0.08;
    }
    score.clamp(0.0, 1.0)
}
