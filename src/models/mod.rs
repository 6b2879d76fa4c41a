//! Classifiers, artifact loading and multi-model inference

pub mod classifier;
pub mod comparison;
pub mod dispatcher;
pub mod inference;
pub mod loader;
pub mod native;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod registry;

pub use classifier::Classifier;
pub use comparison::{ComparisonReport, Consensus, ModelFailure};
pub use inference::{InferenceEngine, ScoredRecord};
pub use loader::ModelLoader;
pub use native::NativeModel;
pub use registry::{ModelEntry, ModelRegistry};
