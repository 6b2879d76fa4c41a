//! Raw classifier output types

use serde::{Deserialize, Serialize};

/// Probability at or above which a customer is labelled as churning.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary churn label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnLabel {
    NoChurn,
    Churn,
}

impl ChurnLabel {
    /// Label implied by a churn probability.
    pub fn from_probability(p_churn: f64) -> Self {
        if p_churn >= DECISION_THRESHOLD {
            ChurnLabel::Churn
        } else {
            ChurnLabel::NoChurn
        }
    }

    /// Text used in exports and tables
    pub fn as_str(self) -> &'static str {
        match self {
            ChurnLabel::Churn => "CHURN",
            ChurnLabel::NoChurn => "NO CHURN",
        }
    }
}

impl std::fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability distribution over {No, Yes}.
///
/// Only the churn probability is stored; the complement is derived so the
/// pair always sums to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    churn: f64,
}

impl ClassProbabilities {
    pub fn from_churn(churn: f64) -> Self {
        Self { churn }
    }

    pub fn churn(&self) -> f64 {
        self.churn
    }

    pub fn no_churn(&self) -> f64 {
        1.0 - self.churn
    }

    /// Largest class probability
    pub fn confidence(&self) -> f64 {
        self.churn.max(self.no_churn())
    }
}

/// Label and probabilities produced by one classifier for one vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: ChurnLabel,
    pub probabilities: ClassProbabilities,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_threshold_is_inclusive() {
        assert_eq!(ChurnLabel::from_probability(0.5), ChurnLabel::Churn);
        assert_eq!(ChurnLabel::from_probability(0.4999), ChurnLabel::NoChurn);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for p in [0.0, 0.1, 0.25, 0.5, 0.731, 1.0] {
            let probs = ClassProbabilities::from_churn(p);
            assert!((probs.churn() + probs.no_churn() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_confidence_is_max() {
        let probs = ClassProbabilities::from_churn(0.75);
        assert_eq!(probs.confidence(), 0.75);
        assert_eq!(probs.no_churn(), 0.25);

        let probs = ClassProbabilities::from_churn(0.1);
        assert!((probs.confidence() - 0.9).abs() < 1e-12);
    }
}
