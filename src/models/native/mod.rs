//! Pure-Rust classifiers read from JSON artifacts

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod svm;
pub mod tree;

pub use boosting::GradientBoostedTrees;
pub use forest::RandomForest;
pub use linear::LogisticRegression;
pub use svm::{Kernel, SupportVectorMachine};
pub use tree::{DecisionTree, SplitRule, TreeNode};

use crate::error::Result;
use crate::models::classifier::Classifier;
use serde::{Deserialize, Serialize};

/// JSON model artifact, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NativeModel {
    LogisticRegression(LogisticRegression),
    GradientBoostedTrees(GradientBoostedTrees),
    RandomForest(RandomForest),
    SupportVectorMachine(SupportVectorMachine),
}

impl NativeModel {
    pub fn validate(&self) -> Result<()> {
        match self {
            NativeModel::LogisticRegression(m) => m.validate(),
            NativeModel::GradientBoostedTrees(m) => m.validate(),
            NativeModel::RandomForest(m) => m.validate(),
            NativeModel::SupportVectorMachine(m) => m.validate(),
        }
    }

    pub fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            NativeModel::LogisticRegression(m) => Box::new(m),
            NativeModel::GradientBoostedTrees(m) => Box::new(m),
            NativeModel::RandomForest(m) => Box::new(m),
            NativeModel::SupportVectorMachine(m) => Box::new(m),
        }
    }
}
