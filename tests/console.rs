//! End-to-end tests over artifacts written to a temporary directory

use churn_prediction::config::AppConfig;
use churn_prediction::error::Result;
use churn_prediction::export::PredictionExport;
use churn_prediction::interpret::{ActionPlan, ConfidenceTier, RiskFraming};
use churn_prediction::models::{Classifier, ModelEntry, ModelRegistry};
use churn_prediction::report;
use churn_prediction::scaler::Scaler;
use churn_prediction::{
    demo, ArtifactCache, ArtifactStore, ChurnError, ChurnLabel, CustomerForm, InferenceEngine,
    Preset,
};
use std::sync::Arc;

fn engine_from_disk() -> (tempfile::TempDir, InferenceEngine) {
    let dir = tempfile::tempdir().unwrap();
    demo::write_artifacts(dir.path()).unwrap();
    let store = ArtifactStore::load(&demo::artifacts_config(dir.path())).unwrap();
    (dir, InferenceEngine::new(Arc::new(store)))
}

/// Always answers with the same probabilities
struct FixedClassifier {
    n_features: usize,
    proba: [f64; 2],
}

impl Classifier for FixedClassifier {
    fn family(&self) -> &'static str {
        "fixed"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<[f64; 2]> {
        Ok(self.proba)
    }
}

fn fixed_engine(proba: [f64; 2]) -> InferenceEngine {
    let schema = demo::telco_schema().unwrap();
    let config = &AppConfig::default().artifacts.models[0];
    let entry = ModelEntry::new(
        config,
        Box::new(FixedClassifier {
            n_features: schema.len(),
            proba,
        }),
    );
    let registry = ModelRegistry::new(vec![entry], &config.key).unwrap();
    let store = ArtifactStore::from_parts(schema, demo::telco_scaler(), registry).unwrap();
    InferenceEngine::new(Arc::new(store))
}

#[test]
fn test_predict_from_written_artifacts() {
    let (_dir, engine) = engine_from_disk();
    assert_eq!(engine.model_count(), 4);

    let risky = engine.predict(&demo::high_risk_record(), None).unwrap();
    assert_eq!(risky.result.model, "xgboost");
    assert_eq!(risky.result.label, ChurnLabel::Churn);
    assert_eq!(risky.result.risk, RiskFraming::HighRisk);
    assert_eq!(risky.encoded.len(), 21);

    let loyal = engine
        .predict(&demo::loyal_record(), Some("logistic_regression"))
        .unwrap();
    assert_eq!(loyal.result.label, ChurnLabel::NoChurn);
    assert_eq!(loyal.result.action, ActionPlan::RetentionUpsell);
}

#[test]
fn test_compare_from_written_artifacts() {
    let (_dir, engine) = engine_from_disk();
    let report = engine.compare(&demo::high_risk_record()).unwrap();

    assert!(report.failures.is_empty());
    let keys: Vec<&str> = report.results.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(keys, vec!["xgboost", "logistic_regression", "random_forest", "svm"]);

    let consensus = report.consensus.unwrap();
    assert_eq!(consensus.churn_vote_share, 1.0);
    assert!(consensus.min_churn <= consensus.mean_churn);
    assert!(consensus.mean_churn <= consensus.max_churn);

    let text = report::render_comparison(&report, engine.store().registry());
    assert!(text.contains("Support Vector Machine"));
    assert!(text.contains("100.00% of models vote churn"));
}

#[test]
fn test_moderate_churn_scenario() {
    let engine = fixed_engine([0.25, 0.75]);
    let scored = engine.predict(&demo::sample_record(), None).unwrap();
    let result = scored.result;

    assert_eq!(result.label, ChurnLabel::Churn);
    assert_eq!(result.confidence, 0.75);
    assert_eq!(result.tier, ConfidenceTier::High);
    assert_eq!(result.action, ActionPlan::Preventive);

    let text = report::render_prediction(&result, "XGBoost (Balanced)");
    assert!(text.contains("P(Churn):    75.00%"));
    assert!(text.contains("Confidence:  75.00% [High]"));
}

#[test]
fn test_probability_outside_unit_interval_is_inference_error() {
    let engine = fixed_engine([-0.5, 1.5]);
    let err = engine.predict(&demo::sample_record(), None).unwrap_err();
    assert!(matches!(err, ChurnError::Inference { .. }));
    assert!(!err.is_fatal());

    // The engine keeps serving after a failed request.
    assert_eq!(engine.metrics().failures.load(std::sync::atomic::Ordering::Relaxed), 1);
    assert!(engine.encode(&demo::sample_record()).is_ok());
}

#[test]
fn test_missing_model_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    demo::write_artifacts(dir.path()).unwrap();
    let config = demo::artifacts_config(dir.path());
    std::fs::remove_file(config.model_path(&config.models[2])).unwrap();

    let err = ArtifactStore::load(&config).unwrap_err();
    assert!(matches!(err, ChurnError::ArtifactLoad { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_scaler_width_mismatch_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    demo::write_artifacts(dir.path()).unwrap();
    let config = demo::artifacts_config(dir.path());
    let narrow = Scaler::Standard {
        mean: vec![0.0; 3],
        scale: vec![1.0; 3],
    };
    std::fs::write(config.scaler_path(), serde_json::to_vec(&narrow).unwrap()).unwrap();

    let err = ArtifactStore::load(&config).unwrap_err();
    assert!(matches!(err, ChurnError::SchemaMismatch { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_cache_recovers_after_artifacts_appear() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ArtifactCache::new(demo::artifacts_config(dir.path()));

    assert!(cache.get_or_load().is_err());
    assert!(!cache.is_loaded());

    demo::write_artifacts(dir.path()).unwrap();
    let first = cache.get_or_load().unwrap();
    let second = cache.get_or_load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_unknown_model_key() {
    let (_dir, engine) = engine_from_disk();
    let err = engine
        .predict(&demo::sample_record(), Some("neural_net"))
        .unwrap_err();
    assert!(matches!(err, ChurnError::UnknownModel(_)));
}

#[test]
fn test_zero_tenure_customer_end_to_end() {
    let (dir, engine) = engine_from_disk();

    let mut form = CustomerForm::default();
    form.apply_preset(Preset::Young).unwrap();
    form.apply_override("tenure=0").unwrap();
    form.apply_override("TotalCharges=500").unwrap();
    let record = form.finish().unwrap();

    let mut zeroed = record.clone();
    zeroed.total_charges = 0.0;
    assert_eq!(engine.encode(&record).unwrap(), engine.encode(&zeroed).unwrap());

    let scored = engine.predict(&record, Some("random_forest")).unwrap();
    let export = PredictionExport::new(scored.result, record);
    let path = export.save(&dir.path().join("exports"), None).unwrap();
    assert!(path.ends_with("churn_prediction_random_forest.csv"));

    let mut reader = csv::Reader::from_path(path).unwrap();
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[2], "random_forest");
    assert_eq!(&row[10], "0");
    assert_eq!(&row[23], "500");
}
