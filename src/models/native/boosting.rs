//! Gradient-boosted trees with a logistic objective (XGBoost export)

use super::tree::{DecisionTree, SplitRule};
use crate::error::{ChurnError, Result};
use crate::models::classifier::{check_width, sigmoid, Classifier};
use serde::{Deserialize, Serialize};

/// Additive tree ensemble: `p(Yes) = σ(base_margin + Σ tree(x))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub n_features: usize,
    /// `base_score` as a probability, the way XGBoost stores it
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<DecisionTree>,
}

fn default_base_score() -> f64 {
    0.5
}

impl GradientBoostedTrees {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ChurnError::artifact("gradient boosted trees", "no trees"));
        }
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(ChurnError::artifact(
                "gradient boosted trees",
                format!("base_score {} is not in (0, 1)", self.base_score),
            ));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }

    fn base_margin(&self) -> f64 {
        (self.base_score / (1.0 - self.base_score)).ln()
    }

    /// Summed log-odds before the logistic link
    pub fn margin(&self, features: &[f64]) -> f64 {
        self.base_margin()
            + self
                .trees
                .iter()
                .map(|tree| tree.evaluate(features, SplitRule::LessThan))
                .sum::<f64>()
    }
}

impl Classifier for GradientBoostedTrees {
    fn family(&self) -> &'static str {
        "gradient_boosted_trees"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_width(self.family(), self.n_features, features)?;
        let p = sigmoid(self.margin(features));
        Ok([1.0 - p, p])
    }
}
