//! Request-level inference: validate, encode, dispatch, interpret

use crate::encoder::EncodedVector;
use crate::error::Result;
use crate::interpret::{interpret, PredictionResult};
use crate::metrics::SessionMetrics;
use crate::models::comparison::{ComparisonReport, ModelFailure};
use crate::models::dispatcher;
use crate::store::ArtifactStore;
use crate::types::CustomerRecord;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Single-model prediction plus the vector that produced it
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub result: PredictionResult,
    pub encoded: EncodedVector,
}

/// Multi-model inference engine over one loaded artifact store.
pub struct InferenceEngine {
    store: Arc<ArtifactStore>,
    metrics: Arc<SessionMetrics>,
}

impl InferenceEngine {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self::with_metrics(store, Arc::new(SessionMetrics::new()))
    }

    pub fn with_metrics(store: Arc<ArtifactStore>, metrics: Arc<SessionMetrics>) -> Self {
        info!(
            models = ?store.registry().keys(),
            default_model = %store.registry().default_key(),
            features = store.schema().len(),
            "Inference engine initialized"
        );
        Self { store, metrics }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Number of registered models
    pub fn model_count(&self) -> usize {
        self.store.registry().len()
    }

    /// Validate and encode a record against the loaded schema and scaler.
    pub fn encode(&self, record: &CustomerRecord) -> Result<EncodedVector> {
        record.validate()?;
        self.store.encoder().encode(record)
    }

    /// Score a record with one model; `None` selects the default model.
    pub fn predict(&self, record: &CustomerRecord, model: Option<&str>) -> Result<ScoredRecord> {
        let start = Instant::now();
        let registry = self.store.registry();
        let entry = match model {
            Some(key) => registry.get(key)?,
            None => registry.default_entry()?,
        };

        let encoded = self.encode(record)?;
        let classifier = entry.classifier.as_ref();
        let prediction = match dispatcher::predict(&encoded, &entry.key, classifier) {
            Ok(prediction) => prediction,
            Err(e) => {
                self.metrics.record_failure();
                error!(model = %entry.key, error = %e, "Inference failed");
                return Err(e);
            }
        };

        let result = interpret(&entry.key, &prediction);
        let latency = start.elapsed();
        self.metrics.record_prediction(&result, latency);

        info!(
            model = %entry.key,
            label = %result.label,
            p_churn = result.p_churn(),
            tier = %result.tier,
            latency_us = latency.as_micros() as u64,
            "Prediction complete"
        );

        Ok(ScoredRecord { result, encoded })
    }

    /// Score a record with every registered model.
    ///
    /// Encoding errors fail the whole request; a model that fails only
    /// drops out of the report.
    pub fn compare(&self, record: &CustomerRecord) -> Result<ComparisonReport> {
        let start = Instant::now();
        let encoded = self.encode(record)?;

        let mut results = Vec::with_capacity(self.model_count());
        let mut failures = Vec::new();
        for (model, outcome) in dispatcher::predict_all(&encoded, self.store.registry()) {
            match outcome {
                Ok(prediction) => results.push(interpret(&model, &prediction)),
                Err(error) => {
                    self.metrics.record_failure();
                    failures.push(ModelFailure { model, error });
                }
            }
        }

        let latency = start.elapsed();
        for result in &results {
            self.metrics.record_prediction(result, latency);
        }

        let report = ComparisonReport::new(results, failures);
        match &report.consensus {
            Some(consensus) => {
                self.metrics.record_agreement(consensus.agreement);
                info!(
                    models = report.results.len(),
                    failed = report.failures.len(),
                    churn_votes = consensus.churn_vote_share,
                    mean_churn = consensus.mean_churn,
                    agreement = consensus.agreement,
                    latency_us = latency.as_micros() as u64,
                    "Comparison complete"
                );
            }
            None => warn!(failed = report.failures.len(), "No model produced a result"),
        }
        debug!(features = encoded.len(), "Comparison vector");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::error::ChurnError;
    use crate::types::ChurnLabel;
    use std::sync::atomic::Ordering;

    fn engine() -> InferenceEngine {
        InferenceEngine::new(Arc::new(demo::store().unwrap()))
    }

    #[test]
    fn test_predict_default_model() {
        let engine = engine();
        let scored = engine.predict(&demo::sample_record(), None).unwrap();

        assert_eq!(scored.result.model, "xgboost");
        assert_eq!(scored.encoded.len(), 21);
        assert!((scored.result.p_churn() + scored.result.p_no_churn() - 1.0).abs() < 1e-6);
        assert_eq!(
            scored.result.label == ChurnLabel::Churn,
            scored.result.p_churn() >= 0.5
        );
        assert_eq!(engine.metrics().predictions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unknown_model() {
        let err = engine()
            .predict(&demo::sample_record(), Some("catboost"))
            .unwrap_err();
        assert!(matches!(err, ChurnError::UnknownModel(_)));
    }

    #[test]
    fn test_invalid_record_rejected_before_inference() {
        let mut record = demo::sample_record();
        record.monthly_charges = -5.0;
        let engine = engine();
        let err = engine.predict(&record, Some("svm")).unwrap_err();
        assert!(matches!(err, ChurnError::InvalidInput { .. }));
        assert_eq!(engine.metrics().predictions.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_compare_runs_every_model() {
        let engine = engine();
        let report = engine.compare(&demo::sample_record()).unwrap();

        let models: Vec<&str> = report.results.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["xgboost", "logistic_regression", "random_forest", "svm"]);
        assert!(report.failures.is_empty());

        let consensus = report.consensus.unwrap();
        assert!(consensus.min_churn <= consensus.mean_churn);
        assert!(consensus.mean_churn <= consensus.max_churn);
        assert!((0.0..=1.0).contains(&consensus.agreement));
        assert!(engine.metrics().avg_agreement().is_some());
    }

    #[test]
    fn test_high_risk_profile_scores_above_loyal_profile() {
        let engine = engine();
        let risky = engine.predict(&demo::high_risk_record(), Some("logistic_regression")).unwrap();
        let loyal = engine.predict(&demo::loyal_record(), Some("logistic_regression")).unwrap();
        assert!(risky.result.p_churn() > loyal.result.p_churn());
        assert_eq!(risky.result.label, ChurnLabel::Churn);
        assert_eq!(loyal.result.label, ChurnLabel::NoChurn);
    }
}
