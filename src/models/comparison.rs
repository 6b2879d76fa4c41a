//! Consensus statistics across models in comparison mode

use crate::error::ChurnError;
use crate::interpret::PredictionResult;
use crate::types::ChurnLabel;
use serde::Serialize;

/// How far the models agree on one customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Consensus {
    /// Fraction of models voting Churn
    pub churn_vote_share: f64,
    pub mean_churn: f64,
    pub median_churn: f64,
    pub min_churn: f64,
    pub max_churn: f64,
    /// `1 - std-dev(p(Churn))`, clamped to [0, 1]
    pub agreement: f64,
}

impl Consensus {
    /// Summarize churn probabilities from successful models.
    ///
    /// Returns `None` when no model produced a result.
    pub fn from_results(results: &[PredictionResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let scores: Vec<f64> = results.iter().map(PredictionResult::p_churn).collect();
        let n = scores.len() as f64;

        let votes = results
            .iter()
            .filter(|r| r.label == ChurnLabel::Churn)
            .count();
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            churn_vote_share: votes as f64 / n,
            mean_churn: mean,
            median_churn: median(&scores),
            min_churn: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max_churn: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            agreement: 1.0 - variance.sqrt().min(1.0),
        })
    }

    /// Majority label; ties count as churn.
    pub fn majority(&self) -> ChurnLabel {
        ChurnLabel::from_probability(self.churn_vote_share)
    }
}

fn median(scores: &[f64]) -> f64 {
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// A model that failed during comparison
#[derive(Debug)]
pub struct ModelFailure {
    pub model: String,
    pub error: ChurnError,
}

/// Every model's verdict on one customer.
#[derive(Debug)]
pub struct ComparisonReport {
    /// Successful results, in registry order
    pub results: Vec<PredictionResult>,
    pub failures: Vec<ModelFailure>,
    pub consensus: Option<Consensus>,
}

impl ComparisonReport {
    pub fn new(results: Vec<PredictionResult>, failures: Vec<ModelFailure>) -> Self {
        let consensus = Consensus::from_results(&results);
        Self {
            results,
            failures,
            consensus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::interpret;
    use crate::types::{ClassProbabilities, Prediction};

    fn result(model: &str, p_churn: f64) -> PredictionResult {
        interpret(
            model,
            &Prediction {
                label: ChurnLabel::from_probability(p_churn),
                probabilities: ClassProbabilities::from_churn(p_churn),
            },
        )
    }

    #[test]
    fn test_vote_share_and_range() {
        let results = vec![
            result("a", 0.8),
            result("b", 0.6),
            result("c", 0.4),
            result("d", 0.3),
        ];
        let consensus = Consensus::from_results(&results).unwrap();

        assert!((consensus.churn_vote_share - 0.5).abs() < 1e-12);
        assert!((consensus.mean_churn - 0.525).abs() < 1e-12);
        assert!((consensus.median_churn - 0.5).abs() < 1e-12);
        assert_eq!(consensus.min_churn, 0.3);
        assert_eq!(consensus.max_churn, 0.8);
        assert_eq!(consensus.majority(), ChurnLabel::Churn);
    }

    #[test]
    fn test_agreement_high_when_models_align() {
        let results = vec![result("a", 0.8), result("b", 0.82), result("c", 0.79)];
        let consensus = Consensus::from_results(&results).unwrap();
        assert!(consensus.agreement > 0.9);

        let split = vec![result("a", 0.0), result("b", 1.0)];
        let consensus = Consensus::from_results(&split).unwrap();
        assert!((consensus.agreement - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_results() {
        let report = ComparisonReport::new(
            Vec::new(),
            vec![ModelFailure {
                model: "svm".to_string(),
                error: ChurnError::inference("svm", "nan"),
            }],
        );
        assert!(report.consensus.is_none());
        assert_eq!(report.failures.len(), 1);
    }
}
