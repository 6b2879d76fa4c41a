//! ONNX Runtime backed classifier

use crate::error::{ChurnError, Result};
use crate::models::classifier::{check_width, Classifier};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::{debug, info};

static ORT_INIT: Once = Once::new();

/// Classifier exported to ONNX (skl2onnx / onnxmltools).
///
/// `Session::run` needs exclusive access, so the session sits behind a mutex.
pub struct OnnxClassifier {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    n_features: usize,
}

impl OnnxClassifier {
    /// Load a model file. `n_features` is the schema width the model was trained on.
    pub fn load<P: AsRef<Path>>(
        path: P,
        name: &str,
        n_features: usize,
        threads: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let artifact = path.display().to_string();

        ORT_INIT.call_once(|| {
            if let Err(e) = ort::init().commit() {
                tracing::warn!(error = %e, "ONNX Runtime environment init failed");
            }
        });

        info!(model = %name, path = %path.display(), threads, "Loading ONNX model");

        let session = Session::builder()
            .map_err(|e| load_error(&artifact, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(&artifact, e))?
            .with_intra_threads(threads)
            .map_err(|e| load_error(&artifact, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(&artifact, e))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| ChurnError::artifact(artifact, "model has no outputs"))?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
            n_features,
        })
    }

    fn run(&self, features: &[f64]) -> Result<f64> {
        let values: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = vec![1_i64, values.len() as i64];
        let input = Tensor::from_array((shape, values))
            .map_err(|e| ChurnError::inference(&self.name, e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ChurnError::inference(&self.name, format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| ChurnError::inference(&self.name, e))?;

        self.extract_churn_probability(&outputs)
    }

    /// Probability of class 1 from either a `[1, 2]` tensor or a `seq(map(int64, float))`.
    fn extract_churn_probability(&self, outputs: &SessionOutputs) -> Result<f64> {
        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ChurnError::inference(&self.name, format!("missing output '{}'", self.output_name))
        })?;

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let p = churn_from_tensor(&dims, data).ok_or_else(|| {
                ChurnError::inference(
                    &self.name,
                    format!("unexpected probability tensor shape {dims:?}"),
                )
            })?;
            debug!(model = %self.name, p_churn = p, "Extracted from tensor");
            return Ok(p);
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return self.extract_from_sequence_map(output);
        }

        Err(ChurnError::inference(
            &self.name,
            "output is neither a tensor nor a sequence of maps",
        ))
    }

    fn extract_from_sequence_map(&self, output: &DynValue) -> Result<f64> {
        let allocator = Allocator::default();
        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| ChurnError::inference(&self.name, e))?;
        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| ChurnError::inference(&self.name, e))?;
        let first = maps
            .first()
            .ok_or_else(|| ChurnError::inference(&self.name, "empty probability sequence"))?;
        let pairs = first
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| ChurnError::inference(&self.name, e))?;

        let p = churn_from_class_map(&pairs)
            .ok_or_else(|| ChurnError::inference(&self.name, "no class probability in map"))?;
        debug!(model = %self.name, p_churn = p, "Extracted from seq(map)");
        Ok(p)
    }
}

/// p(class 1) from a probability tensor: `[.., 2]` holds both classes,
/// `[.., 1]` holds only the positive class.
fn churn_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let p = match (dims.last(), data) {
        (Some(&n), [_, p_yes, ..]) if n >= 2 => *p_yes,
        (Some(&1), [p_yes, ..]) => *p_yes,
        _ => return None,
    };
    Some(f64::from(p))
}

/// p(class 1) from ZipMap-style `(class, probability)` pairs.
fn churn_from_class_map(pairs: &[(i64, f32)]) -> Option<f64> {
    if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Some(f64::from(*p));
    }
    pairs
        .iter()
        .find(|(class, _)| *class == 0)
        .map(|(_, p)| 1.0 - f64::from(*p))
}

fn load_error(artifact: &str, e: impl std::fmt::Display) -> ChurnError {
    ChurnError::artifact(artifact, e)
}

impl Classifier for OnnxClassifier {
    fn family(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2]> {
        check_width(self.family(), self.n_features, features)?;
        let p = self.run(features)?;
        Ok([1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_with_both_classes() {
        assert_eq!(churn_from_tensor(&[1, 2], &[0.25, 0.75]), Some(0.75));
    }

    #[test]
    fn test_tensor_with_positive_class_only() {
        assert_eq!(churn_from_tensor(&[1, 1], &[0.5]), Some(0.5));
    }

    #[test]
    fn test_tensor_shape_rejected() {
        assert_eq!(churn_from_tensor(&[1, 3], &[0.5]), None);
        assert_eq!(churn_from_tensor(&[], &[]), None);
    }

    #[test]
    fn test_class_map() {
        assert_eq!(churn_from_class_map(&[(0, 0.25), (1, 0.75)]), Some(0.75));
        assert_eq!(churn_from_class_map(&[(0, 0.25)]), Some(0.75));
        assert_eq!(churn_from_class_map(&[(2, 0.5)]), None);
    }

    #[test]
    fn test_missing_model_file_is_artifact_error() {
        let err = OnnxClassifier::load("/nonexistent/xgboost.onnx", "xgboost", 21, 1)
            .err()
            .unwrap();
        assert!(matches!(err, ChurnError::ArtifactLoad { .. }));
        assert!(err.is_fatal());
    }
}
