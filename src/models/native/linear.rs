//! Logistic regression

use crate::error::{ChurnError, Result};
use crate::models::classifier::{check_width, sigmoid, Classifier};
use serde::{Deserialize, Serialize};

/// Binary logistic regression: `p(Yes) = σ(w·x + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(ChurnError::artifact("logistic regression", "no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ChurnError::artifact(
                "logistic regression",
                "non-finite parameters",
            ));
        }
        Ok(())
    }

    /// Raw log-odds for a vector
    pub fn decision_function(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn family(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_width(self.family(), self.n_features(), features)?;
        let p = sigmoid(self.decision_function(features));
        Ok([1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_probability() {
        let model = LogisticRegression {
            coefficients: vec![1.0, -2.0],
            intercept: 0.5,
        };
        // z = 1.5 - 2.0 + 0.5 = 0
        let [p_no, p_yes] = model.predict_proba(&[1.5, 1.0]).unwrap();
        assert!((p_yes - 0.5).abs() < 1e-12);
        assert!((p_no + p_yes - 1.0).abs() < 1e-12);

        let [_, p_yes] = model.predict_proba(&[3.0, 0.0]).unwrap();
        assert!((p_yes - sigmoid(3.5)).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_width() {
        let model = LogisticRegression {
            coefficients: vec![1.0, -2.0],
            intercept: 0.0,
        };
        assert!(model.predict_proba(&[1.0]).is_err());
    }

    #[test]
    fn test_validate() {
        let model = LogisticRegression {
            coefficients: vec![f64::NAN],
            intercept: 0.0,
        };
        assert!(model.validate().is_err());
    }
}
