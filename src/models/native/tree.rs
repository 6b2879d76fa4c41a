//! Decision tree shared by the boosted and bagged ensembles

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};

/// Comparison used at split nodes.
///
/// XGBoost sends `x < threshold` left, scikit-learn sends `x <= threshold` left.
/// Both libraries cast inputs to f32 before comparing; XGBoost also stores
/// its cut points as f32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    LessThan,
    LessOrEqual,
}

/// A node in a decision tree, stored in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split node
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Direction for NaN inputs
        #[serde(default)]
        default_left: bool,
    },
    /// Leaf node with a value
    Leaf { value: f64 },
}

/// Decision tree with the root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check node references so that evaluation always terminates.
    ///
    /// Children must point forward in the array, which rules out cycles.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ChurnError::artifact("decision tree", "tree has no nodes"));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(ChurnError::artifact(
                            "decision tree",
                            format!("node {i} splits on feature {feature} of {n_features}"),
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(ChurnError::artifact(
                            "decision tree",
                            format!("node {i} has a NaN threshold"),
                        ));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ChurnError::artifact(
                                "decision tree",
                                format!("node {i} has invalid child {child}"),
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ChurnError::artifact(
                            "decision tree",
                            format!("leaf {i} is not finite"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its value.
    pub fn evaluate(&self, features: &[f64], rule: SplitRule) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[feature];
                    let go_left = if x.is_nan() {
                        default_left
                    } else {
                        match rule {
                            SplitRule::LessThan => (x as f32) < (threshold as f32),
                            SplitRule::LessOrEqual => f64::from(x as f32) <= threshold,
                        }
                    };
                    idx = if go_left { left } else { right };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, left: f64, right: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                    default_left: true,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn test_split_rules_differ_at_threshold() {
        let tree = stump(1.0, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[1.0], SplitRule::LessThan), 1.0);
        assert_eq!(tree.evaluate(&[1.0], SplitRule::LessOrEqual), -1.0);
        assert_eq!(tree.evaluate(&[0.5], SplitRule::LessThan), -1.0);
    }

    #[test]
    fn test_comparison_in_f32() {
        // In f64, 0.1 sits just below the f32 cut point; cast to f32 they are equal.
        let threshold = f64::from(0.1f32);
        let tree = stump(threshold, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[0.1], SplitRule::LessThan), 1.0);
        assert_eq!(tree.evaluate(&[0.0999], SplitRule::LessThan), -1.0);

        // f32(0.1) rounds above 0.1, so the cast input is no longer <= 0.1.
        let tree = stump(0.1, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[0.1], SplitRule::LessOrEqual), 1.0);
        assert_eq!(tree.evaluate(&[0.09], SplitRule::LessOrEqual), -1.0);
    }

    #[test]
    fn test_nan_follows_default() {
        let tree = stump(1.0, -1.0, 1.0);
        assert_eq!(tree.evaluate(&[f64::NAN], SplitRule::LessThan), -1.0);
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                    default_left: false,
                },
                TreeNode::Leaf { value: 0.0 },
            ],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_feature() {
        assert!(stump(0.0, 0.0, 1.0).validate(1).is_ok());
        assert!(stump(0.0, 0.0, 1.0).validate(0).is_err());
    }

    #[test]
    fn test_deserialize_nodes() {
        let json = r#"{"nodes":[
            {"type":"split","feature":0,"threshold":0.5,"left":1,"right":2},
            {"type":"leaf","value":0.1},
            {"type":"leaf","value":0.9}
        ]}"#;
        let tree: DecisionTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.evaluate(&[0.7], SplitRule::LessOrEqual), 0.9);
    }
}
