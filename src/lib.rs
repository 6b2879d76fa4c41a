//! Churn Prediction Library
//!
//! Telco customer churn scoring: schema-driven feature encoding, a registry
//! of interchangeable classifiers, and business interpretation of the
//! resulting probabilities.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod demo;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod interpret;
pub mod metrics;
pub mod models;
pub mod presets;
pub mod report;
pub mod scaler;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use encoder::{EncodedVector, FeatureEncoder, FeatureSchema};
pub use error::{ChurnError, Result};
pub use interpret::{interpret, PredictionResult};
pub use models::inference::InferenceEngine;
pub use presets::{CustomerForm, Preset};
pub use store::{ArtifactCache, ArtifactStore};
pub use types::{ChurnLabel, ClassProbabilities, CustomerRecord, Prediction};
