//! Reference artifacts shaped like the Telco training run.
//!
//! The parameters are hand-set, not fitted: they reproduce the direction
//! of the real models (short tenure, fiber, month-to-month and electronic
//! check raise churn risk) so the console and the tests have something
//! realistic to score without the training notebook.

use crate::config::{AppConfig, ArtifactFormat, ArtifactsConfig};
use crate::encoder::FeatureSchema;
use crate::error::Result;
use crate::models::native::{
    DecisionTree, GradientBoostedTrees, Kernel, LogisticRegression, NativeModel, RandomForest,
    SupportVectorMachine, TreeNode,
};
use crate::models::registry::{ModelEntry, ModelRegistry};
use crate::scaler::Scaler;
use crate::store::ArtifactStore;
use crate::types::CustomerRecord;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Training columns after `get_dummies(drop_first=True)`.
pub const TELCO_COLUMNS: [&str; 21] = [
    "SeniorCitizen",
    "tenure",
    "MonthlyCharges",
    "TotalCharges",
    "Partner_Yes",
    "Dependents_Yes",
    "MultipleLines_Yes",
    "InternetService_Fiber optic",
    "InternetService_No",
    "OnlineSecurity_Yes",
    "OnlineBackup_Yes",
    "DeviceProtection_Yes",
    "TechSupport_Yes",
    "StreamingTV_Yes",
    "StreamingMovies_Yes",
    "Contract_One year",
    "Contract_Two year",
    "PaperlessBilling_Yes",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
];

const MEAN: [f64; 21] = [
    0.162, 32.37, 64.76, 2279.73, 0.483, 0.300, 0.422, 0.440, 0.217, 0.287, 0.345, 0.344, 0.290,
    0.384, 0.388, 0.209, 0.241, 0.592, 0.216, 0.336, 0.229,
];

const STD: [f64; 21] = [
    0.369, 24.56, 30.09, 2266.79, 0.500, 0.458, 0.494, 0.496, 0.412, 0.452, 0.475, 0.475, 0.454,
    0.486, 0.487, 0.407, 0.428, 0.491, 0.412, 0.472, 0.420,
];

const LR_COEFFICIENTS: [f64; 21] = [
    0.09, -1.30, 0.20, 0.60, 0.0, -0.08, 0.15, 0.55, -0.30, -0.20, -0.05, 0.0, -0.18, 0.12, 0.12,
    -0.30, -0.65, 0.18, -0.04, 0.17, -0.02,
];

// Column positions used by the tree models
const TENURE: usize = 1;
const FIBER_OPTIC: usize = 7;
const TWO_YEAR: usize = 16;
const ELECTRONIC_CHECK: usize = 19;

/// Aligned (unscaled) prototypes for the SVM support vectors
const CHURNER: [f64; 21] = [
    1.0, 2.0, 90.0, 180.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0,
    0.0, 1.0, 0.0,
];
const STAYER: [f64; 21] = [
    0.0, 60.0, 65.0, 3900.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    1.0, 0.0, 0.0,
];

pub fn telco_schema() -> Result<FeatureSchema> {
    FeatureSchema::new(TELCO_COLUMNS.iter().map(|c| c.to_string()).collect())
}

pub fn telco_scaler() -> Scaler {
    Scaler::Standard {
        mean: MEAN.to_vec(),
        scale: STD.to_vec(),
    }
}

fn standardize(aligned: &[f64; 21]) -> Vec<f64> {
    aligned
        .iter()
        .zip(MEAN.iter().zip(STD.iter()))
        .map(|(x, (m, s))| (x - m) / s)
        .collect()
}

/// Threshold in scaled space for a raw value of column `i`
fn scaled(i: usize, raw: f64) -> f64 {
    (raw - MEAN[i]) / STD[i]
}

fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
    TreeNode::Split {
        feature,
        threshold,
        left,
        right,
        default_left: true,
    }
}

fn leaf(value: f64) -> TreeNode {
    TreeNode::Leaf { value }
}

pub fn logistic_regression() -> LogisticRegression {
    LogisticRegression {
        coefficients: LR_COEFFICIENTS.to_vec(),
        intercept: -0.5,
    }
}

pub fn gradient_boosted_trees() -> GradientBoostedTrees {
    GradientBoostedTrees {
        n_features: TELCO_COLUMNS.len(),
        base_score: 0.5,
        trees: vec![
            DecisionTree {
                nodes: vec![
                    split(TWO_YEAR, scaled(TWO_YEAR, 0.5), 1, 2),
                    split(TENURE, scaled(TENURE, 10.0), 3, 4),
                    leaf(-0.6),
                    leaf(0.45),
                    leaf(0.05),
                ],
            },
            DecisionTree {
                nodes: vec![
                    split(FIBER_OPTIC, scaled(FIBER_OPTIC, 0.5), 1, 2),
                    leaf(-0.15),
                    split(ELECTRONIC_CHECK, scaled(ELECTRONIC_CHECK, 0.5), 3, 4),
                    leaf(0.1),
                    leaf(0.3),
                ],
            },
            DecisionTree {
                nodes: vec![
                    split(TENURE, scaled(TENURE, 20.0), 1, 2),
                    leaf(0.25),
                    leaf(-0.25),
                ],
            },
        ],
    }
}

pub fn random_forest() -> RandomForest {
    RandomForest {
        n_features: TELCO_COLUMNS.len(),
        trees: vec![
            DecisionTree {
                nodes: vec![split(TENURE, scaled(TENURE, 10.0), 1, 2), leaf(0.7), leaf(0.2)],
            },
            DecisionTree {
                nodes: vec![
                    split(TWO_YEAR, scaled(TWO_YEAR, 0.5), 1, 2),
                    split(FIBER_OPTIC, scaled(FIBER_OPTIC, 0.5), 3, 4),
                    leaf(0.05),
                    leaf(0.3),
                    leaf(0.65),
                ],
            },
            DecisionTree {
                nodes: vec![
                    split(ELECTRONIC_CHECK, scaled(ELECTRONIC_CHECK, 0.5), 1, 2),
                    leaf(0.2),
                    leaf(0.55),
                ],
            },
        ],
    }
}

pub fn support_vector_machine() -> SupportVectorMachine {
    SupportVectorMachine {
        kernel: Kernel::Rbf { gamma: 0.05 },
        support_vectors: vec![standardize(&CHURNER), standardize(&STAYER)],
        dual_coef: vec![1.0, -1.0],
        intercept: 0.0,
        prob_a: -3.0,
        prob_b: 0.0,
    }
}

/// All four demo models, keyed like the default configuration
pub fn models() -> Vec<(&'static str, NativeModel)> {
    vec![
        ("xgboost", NativeModel::GradientBoostedTrees(gradient_boosted_trees())),
        ("logistic_regression", NativeModel::LogisticRegression(logistic_regression())),
        ("random_forest", NativeModel::RandomForest(random_forest())),
        ("svm", NativeModel::SupportVectorMachine(support_vector_machine())),
    ]
}

pub fn registry() -> Result<ModelRegistry> {
    let configs = AppConfig::default().artifacts.models;
    let entries = models()
        .into_iter()
        .zip(configs.iter())
        .map(|((_, model), config)| ModelEntry::new(config, model.into_classifier()))
        .collect();
    ModelRegistry::new(entries, "xgboost")
}

/// In-memory store with the demo schema, scaler and models
pub fn store() -> Result<ArtifactStore> {
    ArtifactStore::from_parts(telco_schema()?, telco_scaler(), registry()?)
}

/// Artifacts configuration pointing at `dir`, using the default file names
pub fn artifacts_config(dir: &Path) -> ArtifactsConfig {
    let mut config = AppConfig::default().artifacts;
    config.dir = dir.to_path_buf();
    config
}

/// Write schema, scaler and every demo model as JSON artifacts into `dir`.
pub fn write_artifacts(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let config = artifacts_config(dir);

    write_json(&config.schema_path(), &TELCO_COLUMNS)?;
    write_json(&config.scaler_path(), &telco_scaler())?;

    for ((key, model), model_config) in models().into_iter().zip(&config.models) {
        debug_assert_eq!(key, model_config.key);
        debug_assert_eq!(model_config.format, ArtifactFormat::Json);
        write_json(&config.model_path(model_config), &model)?;
    }

    info!(dir = %dir.display(), models = config.models.len(), "Demo artifacts written");
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| crate::error::ChurnError::artifact(path.display().to_string(), e))?;
    fs::write(path, json)?;
    Ok(())
}

/// One-year DSL customer with middling risk
pub fn sample_record() -> CustomerRecord {
    CustomerRecord {
        senior_citizen: 0,
        partner: "Yes".to_string(),
        dependents: "No".to_string(),
        tenure: 24,
        multiple_lines: "No".to_string(),
        internet_service: "DSL".to_string(),
        online_security: "Yes".to_string(),
        online_backup: "No".to_string(),
        device_protection: "No".to_string(),
        tech_support: "No".to_string(),
        streaming_tv: "No".to_string(),
        streaming_movies: "No".to_string(),
        contract: "One year".to_string(),
        paperless_billing: "Yes".to_string(),
        payment_method: "Mailed check".to_string(),
        monthly_charges: 56.95,
        total_charges: 1366.8,
    }
}

/// New senior fiber customer on a monthly contract paying by electronic check
pub fn high_risk_record() -> CustomerRecord {
    CustomerRecord {
        senior_citizen: 1,
        partner: "No".to_string(),
        dependents: "No".to_string(),
        tenure: 1,
        multiple_lines: "No".to_string(),
        internet_service: "Fiber optic".to_string(),
        online_security: "No".to_string(),
        online_backup: "No".to_string(),
        device_protection: "No".to_string(),
        tech_support: "No".to_string(),
        streaming_tv: "No".to_string(),
        streaming_movies: "No".to_string(),
        contract: "Month-to-month".to_string(),
        paperless_billing: "Yes".to_string(),
        payment_method: "Electronic check".to_string(),
        monthly_charges: 95.0,
        total_charges: 95.0,
    }
}

/// Long-tenure two-year DSL customer with every protection add-on
pub fn loyal_record() -> CustomerRecord {
    CustomerRecord {
        senior_citizen: 0,
        partner: "Yes".to_string(),
        dependents: "Yes".to_string(),
        tenure: 70,
        multiple_lines: "Yes".to_string(),
        internet_service: "DSL".to_string(),
        online_security: "Yes".to_string(),
        online_backup: "Yes".to_string(),
        device_protection: "No".to_string(),
        tech_support: "Yes".to_string(),
        streaming_tv: "No".to_string(),
        streaming_movies: "No".to_string(),
        contract: "Two year".to_string(),
        paperless_billing: "No".to_string(),
        payment_method: "Credit card (automatic)".to_string(),
        monthly_charges: 60.0,
        total_charges: 4200.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_models_are_valid() {
        for (key, model) in models() {
            assert!(model.validate().is_ok(), "{key}");
            assert_eq!(model.into_classifier().n_features(), 21, "{key}");
        }
    }

    #[test]
    fn test_store_assembles() {
        let store = store().unwrap();
        assert_eq!(store.registry().len(), 4);
        assert_eq!(store.registry().default_key(), "xgboost");
    }

    #[test]
    fn test_profiles_separate_across_models() {
        let store = store().unwrap();
        let encoder = store.encoder();
        let risky = encoder.encode(&high_risk_record()).unwrap();
        let loyal = encoder.encode(&loyal_record()).unwrap();

        for entry in store.registry().iter() {
            let [_, p_risky] = entry.classifier.predict_proba(risky.as_slice()).unwrap();
            let [_, p_loyal] = entry.classifier.predict_proba(loyal.as_slice()).unwrap();
            assert!(p_risky > 0.5, "{} scored {p_risky}", entry.key);
            assert!(p_loyal < 0.5, "{} scored {p_loyal}", entry.key);
        }
    }
}
