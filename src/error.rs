//! Error taxonomy for artifact loading, encoding and inference

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Errors raised by the churn prediction core.
///
/// `ArtifactLoad` and `SchemaMismatch` mean the deployed artifacts are
/// unusable and prediction must stay disabled until they are fixed. The
/// remaining variants are scoped to a single request.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// A model, scaler or schema artifact is missing, unreadable or malformed
    #[error("failed to load artifact {artifact}: {reason}")]
    ArtifactLoad { artifact: String, reason: String },

    /// Vector width disagrees with the feature schema
    #[error("schema mismatch in {context}: expected {expected} features, got {actual}")]
    SchemaMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A classifier produced no usable output for this input
    #[error("inference failed for model '{model}': {reason}")]
    Inference { model: String, reason: String },

    /// The model selector names no registry entry
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A request field is out of range or could not be parsed
    #[error("invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The exploration dataset could not be read
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ChurnError {
    pub(crate) fn artifact(artifact: impl Into<String>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn inference(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::Inference {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_input(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Attach the registry name to an inference error raised inside a classifier.
    pub fn for_model(self, name: &str) -> Self {
        match self {
            Self::Inference { reason, .. } => Self::Inference {
                model: name.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// Whether the error disables prediction for the whole deployment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ArtifactLoad { .. } | Self::SchemaMismatch { .. })
    }

    /// Short guidance shown next to the error message.
    pub fn user_hint(&self) -> &'static str {
        match self {
            Self::ArtifactLoad { .. } => {
                "Prediction is disabled. Check that every model, scaler and schema file is present in the artifacts directory."
            }
            Self::SchemaMismatch { .. } => {
                "Prediction is disabled. The model artifacts were produced by incompatible training runs."
            }
            Self::Inference { .. } => {
                "The model could not score this combination of inputs. Adjust the input and try again."
            }
            Self::UnknownModel(_) => "Run the `models` command to list the available model keys.",
            Self::InvalidInput { .. } => "Correct the highlighted field and submit again.",
            Self::Dataset(_) | Self::Csv(_) | Self::Io(_) => {
                "Check that the dataset path in the configuration points to a readable CSV file."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ChurnError::artifact("scaler.json", "missing").is_fatal());
        assert!(ChurnError::SchemaMismatch {
            context: "scaler".to_string(),
            expected: 21,
            actual: 20,
        }
        .is_fatal());
        assert!(!ChurnError::inference("xgboost", "nan").is_fatal());
        assert!(!ChurnError::UnknownModel("catboost".to_string()).is_fatal());
    }

    #[test]
    fn test_for_model_renames_inference_errors_only() {
        let err = ChurnError::inference("logistic_regression", "bad width").for_model("lr");
        assert!(matches!(err, ChurnError::Inference { ref model, .. } if model == "lr"));

        let err = ChurnError::UnknownModel("x".to_string()).for_model("lr");
        assert!(matches!(err, ChurnError::UnknownModel(_)));
    }

    #[test]
    fn test_display() {
        let err = ChurnError::SchemaMismatch {
            context: "encoded vector".to_string(),
            expected: 21,
            actual: 19,
        };
        assert_eq!(
            err.to_string(),
            "schema mismatch in encoded vector: expected 21 features, got 19"
        );
    }
}
