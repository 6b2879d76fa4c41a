//! Kernel support vector machine with Platt-calibrated probabilities

use crate::error::{ChurnError, Result};
use crate::models::classifier::{check_width, Classifier};
use serde::{Deserialize, Serialize};

/// Kernel function, parameterised like scikit-learn's `SVC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Poly { gamma: f64, coef0: f64, degree: i32 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    pub fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        let dot = || a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
        match *self {
            Kernel::Linear => dot(),
            Kernel::Rbf { gamma } => {
                let dist: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * dist).exp()
            }
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => (gamma * dot() + coef0).powi(degree),
            Kernel::Sigmoid { gamma, coef0 } => (gamma * dot() + coef0).tanh(),
        }
    }
}

/// Binary SVC.
///
/// `f(x) = Σ αᵢ K(svᵢ, x) + b` with positive `f` meaning churn, and
/// `p(Yes) = 1 / (1 + exp(A·f + B))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVectorMachine {
    pub kernel: Kernel,
    pub support_vectors: Vec<Vec<f64>>,
    /// Signed dual coefficients, one per support vector
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
    pub prob_a: f64,
    pub prob_b: f64,
}

impl SupportVectorMachine {
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.support_vectors.first() else {
            return Err(ChurnError::artifact("support vector machine", "no support vectors"));
        };
        if self.support_vectors.iter().any(|sv| sv.len() != first.len()) {
            return Err(ChurnError::artifact(
                "support vector machine",
                "support vectors have different widths",
            ));
        }
        if self.dual_coef.len() != self.support_vectors.len() {
            return Err(ChurnError::artifact(
                "support vector machine",
                format!(
                    "{} dual coefficients for {} support vectors",
                    self.dual_coef.len(),
                    self.support_vectors.len()
                ),
            ));
        }
        if !(self.prob_a.is_finite() && self.prob_b.is_finite() && self.intercept.is_finite()) {
            return Err(ChurnError::artifact(
                "support vector machine",
                "non-finite calibration parameters",
            ));
        }
        Ok(())
    }

    pub fn decision_function(&self, features: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, alpha)| alpha * self.kernel.apply(sv, features))
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for SupportVectorMachine {
    fn family(&self) -> &'static str {
        "support_vector_machine"
    }

    fn n_features(&self) -> usize {
        self.support_vectors.first().map_or(0, Vec::len)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_width(self.family(), self.n_features(), features)?;
        let f = self.decision_function(features);
        let p = 1.0 / (1.0 + (self.prob_a * f + self.prob_b).clamp(-500.0, 500.0).exp());
        Ok([1.0 - p, p])
    }
}
