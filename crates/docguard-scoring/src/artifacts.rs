//! Persisted model artifacts.
//!
//! Each document kind ships three JSON artifacts under
//! `MODEL_DIR/<kind>/`: `scaler.json`, `random_forest.json`, and
//! `gradient_boosting.json`. Trees are flattened node arrays; a node with
//! `feature == -1` is a leaf carrying the prediction. Raw regressor output
//! is on a 0..100 risk scale and is divided by 100 and clamped downstream.
//!
//! Every artifact is validated against the kind's declared feature schema
//! at load time; a failure is fatal to construction, never a per-request
//! fallback.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docguard_core::DocumentKind;
use docguard_features::schema::schema_for;

use crate::error::{ScoringError, ScoringResult};

/// Zero-mean unit-variance scaler fitted at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    /// Declared input width.
    pub feature_count: usize,
    /// Per-feature training mean.
    pub mean: Vec<f64>,
    /// Per-feature training standard deviation, strictly positive.
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    /// Transform a raw vector into scaled space.
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn validate(&self, path: &Path, expected: usize) -> ScoringResult<()> {
        if self.feature_count != expected {
            return Err(ScoringError::invalid(
                path,
                format!(
                    "scaler feature_count {} does not match schema width {expected}",
                    self.feature_count
                ),
            ));
        }
        if self.mean.len() != expected || self.scale.len() != expected {
            return Err(ScoringError::invalid(
                path,
                format!(
                    "scaler arrays have lengths {}/{}, schema width is {expected}",
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ScoringError::invalid(
                path,
                "scaler standard deviations must be finite and positive",
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ScoringError::invalid(path, "scaler means must be finite"));
        }
        Ok(())
    }
}

/// One node of a flattened decision tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeNode {
    /// Split feature index, or -1 for a leaf.
    pub feature: i32,
    /// Split threshold; samples with `x[feature] <= threshold` go left.
    pub threshold: f64,
    /// Left child index.
    pub left: u32,
    /// Right child index.
    pub right: u32,
    /// Leaf prediction on the 0..100 risk scale (unused on split nodes).
    pub value: f64,
}

/// A flattened binary decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Evaluate the tree on a scaled feature vector.
    pub fn predict(&self, values: &[f64]) -> f64 {
        let mut index = 0usize;
        // Node count bounds the walk; validated trees terminate sooner.
        for _ in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if node.feature < 0 {
                return node.value;
            }
            let feature_value = values[node.feature as usize];
            index = if feature_value <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
        self.nodes[index].value
    }

    fn validate(&self, path: &Path, feature_count: usize) -> ScoringResult<()> {
        if self.nodes.is_empty() {
            return Err(ScoringError::invalid(path, "tree has no nodes"));
        }
        let node_count = self.nodes.len() as u32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.feature >= 0 {
                if node.feature as usize >= feature_count {
                    return Err(ScoringError::invalid(
                        path,
                        format!("node {i} splits on feature {} beyond width {feature_count}", node.feature),
                    ));
                }
                if node.left >= node_count || node.right >= node_count {
                    return Err(ScoringError::invalid(
                        path,
                        format!("node {i} references a child beyond the node array"),
                    ));
                }
                // Children must point forward so every walk terminates.
                if node.left as usize <= i || node.right as usize <= i {
                    return Err(ScoringError::invalid(
                        path,
                        format!("node {i} references a non-forward child"),
                    ));
                }
                if !node.threshold.is_finite() {
                    return Err(ScoringError::invalid(path, format!("node {i} threshold is not finite")));
                }
            } else if !node.value.is_finite() {
                return Err(ScoringError::invalid(path, format!("leaf {i} value is not finite")));
            }
        }
        Ok(())
    }
}

/// Random-forest regressor artifact: mean of tree predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub feature_count: usize,
    pub trees: Vec<DecisionTree>,
    /// Trained per-feature importances, aligned to the schema order.
    #[serde(default)]
    pub feature_importances: Vec<f64>,
}

impl ForestArtifact {
    /// Predict on the 0..100 risk scale.
    pub fn predict(&self, values: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(values)).sum();
        sum / self.trees.len() as f64
    }

    fn validate(&self, path: &Path, expected: usize) -> ScoringResult<()> {
        if self.feature_count != expected {
            return Err(ScoringError::invalid(
                path,
                format!(
                    "forest feature_count {} does not match schema width {expected}",
                    self.feature_count
                ),
            ));
        }
        if self.trees.is_empty() {
            return Err(ScoringError::invalid(path, "forest has no trees"));
        }
        if !self.feature_importances.is_empty() && self.feature_importances.len() != expected {
            return Err(ScoringError::invalid(
                path,
                "feature_importances length does not match schema width",
            ));
        }
        for tree in &self.trees {
            tree.validate(path, expected)?;
        }
        Ok(())
    }
}

/// Gradient-boosted regressor artifact: base plus learning-rate-weighted
/// tree contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedArtifact {
    pub feature_count: usize,
    /// Prediction before any tree contribution, on the 0..100 scale.
    pub base_prediction: f64,
    pub learning_rate: f64,
    pub trees: Vec<DecisionTree>,
}

impl BoostedArtifact {
    /// Predict on the 0..100 risk scale.
    pub fn predict(&self, values: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(values)).sum();
        self.base_prediction + self.learning_rate * boost
    }

    fn validate(&self, path: &Path, expected: usize) -> ScoringResult<()> {
        if self.feature_count != expected {
            return Err(ScoringError::invalid(
                path,
                format!(
                    "boosted feature_count {} does not match schema width {expected}",
                    self.feature_count
                ),
            ));
        }
        if self.trees.is_empty() {
            return Err(ScoringError::invalid(path, "boosted ensemble has no trees"));
        }
        if !self.base_prediction.is_finite() || !self.learning_rate.is_finite() {
            return Err(ScoringError::invalid(
                path,
                "base prediction and learning rate must be finite",
            ));
        }
        for tree in &self.trees {
            tree.validate(path, expected)?;
        }
        Ok(())
    }
}

/// The loaded artifact set for one document kind.
#[derive(Debug, Clone)]
pub struct KindModels {
    pub scaler: ScalerArtifact,
    pub forest: ForestArtifact,
    pub boosted: BoostedArtifact,
}

impl KindModels {
    /// Load and validate the three artifacts for a kind from
    /// `model_dir/<kind>/`.
    pub fn load(model_dir: &Path, kind: DocumentKind) -> ScoringResult<Self> {
        let dir = model_dir.join(kind.as_str());
        let expected = schema_for(kind).len();

        let scaler_path = dir.join("scaler.json");
        let scaler: ScalerArtifact = read_artifact(&scaler_path)?;
        scaler.validate(&scaler_path, expected)?;

        let forest_path = dir.join("random_forest.json");
        let forest: ForestArtifact = read_artifact(&forest_path)?;
        forest.validate(&forest_path, expected)?;

        let boosted_path = dir.join("gradient_boosting.json");
        let boosted: BoostedArtifact = read_artifact(&boosted_path)?;
        boosted.validate(&boosted_path, expected)?;

        Ok(Self {
            scaler,
            forest,
            boosted,
        })
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> ScoringResult<T> {
    let content = std::fs::read_to_string(path).map_err(|_| ScoringError::ArtifactMissing {
        path: path.to_path_buf(),
    })?;
    serde_json::from_str(&content).map_err(|e| ScoringError::invalid(path, e.to_string()))
}
