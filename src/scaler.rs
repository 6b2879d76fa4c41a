//! Fitted feature scaler applied after schema alignment

use crate::encoder::{AlignedFeatures, EncodedVector};
use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};

/// Scaler parameters exported by the training process.
///
/// Parameters are fixed at load time; `transform` never refits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Check internal consistency of the fitted parameters.
    pub fn validate(&self) -> Result<()> {
        let (offset, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };
        if offset.len() != scale.len() {
            return Err(ChurnError::artifact(
                "scaler",
                format!(
                    "offset has {} entries but scale has {}",
                    offset.len(),
                    scale.len()
                ),
            ));
        }
        if let Some(i) = offset.iter().position(|v| !v.is_finite()) {
            return Err(ChurnError::artifact(
                "scaler",
                format!("non-finite offset at column {i}"),
            ));
        }
        if let Some(i) = scale.iter().position(|v| !v.is_finite()) {
            return Err(ChurnError::artifact(
                "scaler",
                format!("non-finite scale at column {i}"),
            ));
        }
        if let Scaler::Standard { scale, .. } = self {
            if let Some(i) = scale.iter().position(|&v| v == 0.0) {
                return Err(ChurnError::artifact(
                    "scaler",
                    format!("zero standard deviation at column {i}"),
                ));
            }
        }
        Ok(())
    }

    /// Scale an aligned feature vector.
    pub fn transform(&self, features: &AlignedFeatures) -> Result<EncodedVector> {
        let values = features.as_slice();
        if values.len() != self.n_features() {
            return Err(ChurnError::SchemaMismatch {
                context: "scaler input".to_string(),
                expected: self.n_features(),
                actual: values.len(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            Scaler::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };

        Ok(EncodedVector::new(scaled))
    }
}
