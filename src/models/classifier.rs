//! Capability interface shared by every model family

use crate::error::{ChurnError, Result};
use crate::types::ChurnLabel;

/// A fitted binary churn classifier.
///
/// Implementations must be deterministic and free of side effects so the
/// same instance can be shared across threads and evaluated in parallel.
pub trait Classifier: Send + Sync {
    /// Model family name used in logs
    fn family(&self) -> &'static str;

    /// Input width the classifier was fitted on
    fn n_features(&self) -> usize;

    /// `[p(No), p(Yes)]` for a single scaled feature vector.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]>;

    /// Hard label for a single scaled feature vector.
    fn predict(&self, features: &[f64]) -> Result<ChurnLabel> {
        let [_, p_yes] = self.predict_proba(features)?;
        Ok(ChurnLabel::from_probability(p_yes))
    }
}

/// Reject vectors whose width differs from what the classifier expects.
pub(crate) fn check_width(family: &str, expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(ChurnError::inference(
            family,
            format!(
                "expected {} features, got {}",
                expected,
                features.len()
            ),
        ));
    }
    Ok(())
}

/// Logistic function, clamped to avoid overflow in `exp`.
pub(crate) fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-z).exp())
}
