//! Artifact loader for the feature schema, scaler and classifiers

use crate::config::{ArtifactFormat, ArtifactsConfig, ModelConfig};
use crate::encoder::FeatureSchema;
use crate::error::{ChurnError, Result};
use crate::models::classifier::Classifier;
use crate::models::native::NativeModel;
use crate::models::registry::{ModelEntry, ModelRegistry};
use crate::scaler::Scaler;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Reads the artifacts written by the training notebook.
pub struct ModelLoader {
    /// Number of intra-op threads for ONNX sessions
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a loader with one ONNX thread per session
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load the ordered column list.
    pub fn load_schema<P: AsRef<Path>>(&self, path: P) -> Result<FeatureSchema> {
        let path = path.as_ref();
        let columns: Vec<String> = read_json(path)?;
        let schema = FeatureSchema::new(columns)
            .map_err(|e| ChurnError::artifact(path.display().to_string(), e))?;

        info!(path = %path.display(), columns = schema.len(), "Feature schema loaded");
        Ok(schema)
    }

    /// Load scaler parameters and check them against the schema width.
    pub fn load_scaler<P: AsRef<Path>>(&self, path: P, schema: &FeatureSchema) -> Result<Scaler> {
        let path = path.as_ref();
        let scaler: Scaler = read_json(path)?;
        scaler
            .validate()
            .map_err(|e| ChurnError::artifact(path.display().to_string(), e))?;

        if scaler.n_features() != schema.len() {
            return Err(ChurnError::SchemaMismatch {
                context: format!("scaler {}", path.display()),
                expected: schema.len(),
                actual: scaler.n_features(),
            });
        }

        info!(path = %path.display(), features = scaler.n_features(), "Scaler loaded");
        Ok(scaler)
    }

    /// Load one classifier in the configured format.
    pub fn load_model<P: AsRef<Path>>(
        &self,
        path: P,
        model: &ModelConfig,
        expected_features: usize,
    ) -> Result<Box<dyn Classifier>> {
        let path = path.as_ref();

        info!(
            model = %model.key,
            path = %path.display(),
            format = ?model.format,
            "Loading model"
        );

        let classifier: Box<dyn Classifier> = match model.format {
            ArtifactFormat::Json => {
                let native: NativeModel = read_json(path)?;
                native
                    .validate()
                    .map_err(|e| ChurnError::artifact(path.display().to_string(), e))?;
                native.into_classifier()
            }
            ArtifactFormat::Onnx => self.load_onnx(path, model, expected_features)?,
        };

        if classifier.n_features() != expected_features {
            return Err(ChurnError::SchemaMismatch {
                context: format!("model '{}'", model.key),
                expected: expected_features,
                actual: classifier.n_features(),
            });
        }

        debug!(model = %model.key, family = classifier.family(), "Model ready");
        Ok(classifier)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(
        &self,
        path: &Path,
        model: &ModelConfig,
        expected_features: usize,
    ) -> Result<Box<dyn Classifier>> {
        if !path.exists() {
            return Err(ChurnError::artifact(path.display().to_string(), "file not found"));
        }
        let classifier = crate::models::onnx::OnnxClassifier::load(
            path,
            &model.key,
            expected_features,
            self.onnx_threads,
        )?;
        Ok(Box::new(classifier))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(
        &self,
        path: &Path,
        model: &ModelConfig,
        _expected_features: usize,
    ) -> Result<Box<dyn Classifier>> {
        tracing::error!(
            model = %model.key,
            threads = self.onnx_threads,
            "ONNX artifact configured but the crate was built without the onnx feature"
        );
        Err(ChurnError::artifact(
            path.display().to_string(),
            "built without the `onnx` feature",
        ))
    }

    /// Load every configured model, in configured order.
    ///
    /// Unlike a best-effort scan, a single missing or broken model fails
    /// the whole load: the registry always matches the configuration.
    pub fn load_all(
        &self,
        config: &ArtifactsConfig,
        schema: &FeatureSchema,
    ) -> Result<ModelRegistry> {
        let mut entries = Vec::with_capacity(config.models.len());

        for model in &config.models {
            let classifier = self.load_model(config.model_path(model), model, schema.len())?;
            entries.push(ModelEntry::new(model, classifier));
        }

        let registry = ModelRegistry::new(entries, &config.default_model)?;
        info!(
            count = registry.len(),
            dir = %config.dir.display(),
            "Loaded {} models",
            registry.len()
        );
        Ok(registry)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let artifact = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| ChurnError::artifact(artifact.as_str(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| ChurnError::artifact(artifact, e))
}
