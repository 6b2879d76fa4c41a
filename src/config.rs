//! Configuration management for the churn prediction console

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Serialization format of a model artifact
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Native JSON parameters evaluated in-process
    #[default]
    Json,
    /// ONNX graph run through ONNX Runtime (requires the `onnx` feature)
    Onnx,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Trained artifacts produced by the training notebook
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding all artifact files
    pub dir: PathBuf,
    /// JSON array of feature column names, in training order
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
    /// JSON scaler parameters
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Model used when the request names none
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Intra-op threads per ONNX session
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Registry entries, in display order
    pub models: Vec<ModelConfig>,
}

/// One classifier in the registry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Stable key used on the command line
    pub key: String,
    pub display_name: String,
    pub file: String,
    #[serde(default)]
    pub format: ArtifactFormat,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub strength: String,
}

/// Exploration dataset
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

/// Where exported predictions are written
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_schema_file() -> String {
    "model_columns.json".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_model() -> String {
    "xgboost".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/Churn.csv"),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("exports"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ArtifactsConfig {
    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(&self.schema_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler_file)
    }

    pub fn model_path(&self, model: &ModelConfig) -> PathBuf {
        self.dir.join(&model.file)
    }
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let models = &self.artifacts.models;
        if models.is_empty() {
            anyhow::bail!("artifacts.models must list at least one model");
        }
        for (i, model) in models.iter().enumerate() {
            if models[..i].iter().any(|m| m.key == model.key) {
                anyhow::bail!("duplicate model key '{}'", model.key);
            }
        }
        if !models.iter().any(|m| m.key == self.artifacts.default_model) {
            anyhow::bail!(
                "default model '{}' is not in artifacts.models",
                self.artifacts.default_model
            );
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let model = |key: &str, display_name: &str, file: &str, description: &str, strength: &str| {
            ModelConfig {
                key: key.to_string(),
                display_name: display_name.to_string(),
                file: file.to_string(),
                format: ArtifactFormat::Json,
                description: description.to_string(),
                strength: strength.to_string(),
            }
        };

        Self {
            artifacts: ArtifactsConfig {
                dir: PathBuf::from("artifacts"),
                schema_file: default_schema_file(),
                scaler_file: default_scaler_file(),
                default_model: default_model(),
                onnx_threads: default_onnx_threads(),
                models: vec![
                    model(
                        "xgboost",
                        "XGBoost (Balanced)",
                        "xgboost_churn_model.json",
                        "Boosted tree ensemble with the best balance of precision and recall.",
                        "High accuracy, stable, fast to score",
                    ),
                    model(
                        "logistic_regression",
                        "Logistic Regression (Maximum Detection)",
                        "logistic_regression_churn_model.json",
                        "Catches the largest share of churners; suited to early warning.",
                        "Highest churn recall",
                    ),
                    model(
                        "random_forest",
                        "Random Forest",
                        "random_forest_churn_model.json",
                        "Robust bagged ensemble with interpretable, stable predictions.",
                        "Interpretable, robust to outliers",
                    ),
                    model(
                        "svm",
                        "Support Vector Machine",
                        "support_vector_machine_churn_model.json",
                        "Maximum-margin classifier for complex decision boundaries.",
                        "Complex pattern recognition",
                    ),
                ],
            },
            dataset: DatasetConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
