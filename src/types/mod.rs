//! Type definitions for the churn prediction core

pub mod prediction;
pub mod record;

pub use prediction::{ChurnLabel, ClassProbabilities, Prediction};
pub use record::{CustomerRecord, FieldValue};
