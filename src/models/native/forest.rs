//! Random forest with probability leaves (scikit-learn export)

use super::tree::{DecisionTree, SplitRule};
use crate::error::{ChurnError, Result};
use crate::models::classifier::{check_width, Classifier};
use serde::{Deserialize, Serialize};

/// Bagged trees whose leaves hold `p(Yes)`; the forest averages them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ChurnError::artifact("random forest", "no trees"));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn family(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_width(self.family(), self.n_features, features)?;
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.evaluate(features, SplitRule::LessOrEqual))
            .sum();
        let p = (total / self.trees.len() as f64).clamp(0.0, 1.0);
        Ok([1.0 - p, p])
    }
}
