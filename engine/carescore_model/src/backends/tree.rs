//! Gradient-boosted regression tree ensembles
//!
//! Each tree is a flat node array rooted at index 0. A split sends a row
//! left when `row[feature] < threshold`, right otherwise (a NaN feature
//! goes right). The ensemble margin is `base_score` plus the sum of the
//! reached leaves.

use crate::backend::{ModelError, ScoreOutput, Scorer};
use crate::calibration::sigmoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, position: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidModel(format!("tree {position} has no nodes")));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(ModelError::InvalidModel(format!(
                            "tree {position} node {idx} points outside the tree"
                        )));
                    }
                    if *left <= idx || *right <= idx {
                        return Err(ModelError::InvalidModel(format!(
                            "tree {position} node {idx} must point to later nodes"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidModel(format!(
                            "tree {position} node {idx} has a non-finite threshold"
                        )));
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::InvalidModel(format!(
                            "tree {position} leaf {idx} is non-finite"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `row`
    pub fn leaf_value(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0;
        // a valid path visits each node at most once
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                ModelError::InvalidModel(format!("tree node {idx} does not exist"))
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(*feature).ok_or(ModelError::FeatureIndex {
                        index: *feature,
                        len: row.len(),
                    })?;
                    idx = if *x < *threshold { *left } else { *right };
                }
            }
        }
        Err(ModelError::InvalidModel(
            "tree walk did not reach a leaf".into(),
        ))
    }
}

/// Training objective, which decides how the margin is exposed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    BinaryLogistic,
    #[default]
    Regression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub objective: Objective,
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("tree ensemble has no trees".into()));
        }
        if !self.base_score.is_finite() {
            return Err(ModelError::InvalidModel("base_score must be finite".into()));
        }
        for (position, tree) in self.trees.iter().enumerate() {
            tree.validate(position)?;
        }
        Ok(())
    }

    pub fn margin(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut total = self.base_score;
        for tree in &self.trees {
            total += tree.leaf_value(row)?;
        }
        Ok(total)
    }
}

impl Scorer for TreeEnsemble {
    fn score(&self, row: &[f64]) -> Result<ScoreOutput, ModelError> {
        let margin = self.margin(row)?;
        let out = match self.objective {
            Objective::BinaryLogistic => {
                let p = sigmoid(margin);
                ScoreOutput::Probabilities(vec![1.0 - p, p])
            }
            Objective::Regression => ScoreOutput::Value(margin),
        };
        out.checked()
    }

    fn kind(&self) -> &str {
        "tree_ensemble"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn regression_sums_leaves() {
        let ensemble = TreeEnsemble {
            trees: vec![stump(0, 65.0, 0.0, 0.3), stump(1, 0.5, -0.1, 0.2)],
            base_score: 0.1,
            objective: Objective::Regression,
        };
        ensemble.validate().unwrap();
        let out = ensemble.score(&[80.0, 1.0]).unwrap();
        assert_eq!(out, ScoreOutput::Value(0.1 + 0.3 + 0.2));
        let out = ensemble.score(&[50.0, 0.0]).unwrap();
        assert_eq!(out, ScoreOutput::Value(0.1 + 0.0 - 0.1));
    }

    #[test]
    fn binary_logistic_yields_probabilities() {
        let ensemble = TreeEnsemble {
            trees: vec![stump(0, 1.0, -2.0, 2.0)],
            base_score: 0.0,
            objective: Objective::BinaryLogistic,
        };
        let ScoreOutput::Probabilities(p) = ensemble.score(&[5.0]).unwrap() else {
            panic!("expected probabilities");
        };
        assert!((p[1] - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn short_row_reports_feature_index() {
        let ensemble = TreeEnsemble {
            trees: vec![stump(3, 1.0, 0.0, 1.0)],
            base_score: 0.0,
            objective: Objective::Regression,
        };
        assert!(matches!(
            ensemble.score(&[1.0]),
            Err(ModelError::FeatureIndex { index: 3, len: 1 })
        ));
    }

    #[test]
    fn backward_pointing_split_rejected() {
        let tree = Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { value: 1.0 },
            ],
        };
        let ensemble = TreeEnsemble {
            trees: vec![tree],
            base_score: 0.0,
            objective: Objective::Regression,
        };
        assert!(matches!(ensemble.validate(), Err(ModelError::InvalidModel(_))));
    }

    #[test]
    fn nodes_deserialize_untagged() {
        let json = r#"{"nodes":[{"feature":0,"threshold":1.5,"left":1,"right":2},{"value":-1.0},{"value":1.0}]}"#;
        let tree: Tree = serde_json::from_str(json).unwrap();
        assert_eq!(tree, stump(0, 1.5, -1.0, 1.0));
    }
}
