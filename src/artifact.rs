//! JSON model artifacts.
//!
//! Exported from the trained scikit-learn estimators:
//!
//! ```json
//! {"kind": "linear", "n_features": 6, "coefficients": [...], "intercept": 1.5}
//! {"kind": "decision_tree", "n_features": 8, "children_left": [...], "children_right": [...],
//!  "feature": [...], "threshold": [...], "value": [...]}
//! {"kind": "random_forest", "n_features": 9, "trees": [{"children_left": [...], ...}]}
//! ```
//!
//! Tree arrays follow the fitted `tree_` layout: a node is a leaf when its
//! `children_left` entry is `-1`, and a sample goes left when
//! `x[feature] <= threshold`.

use crate::{
    error::{PredictionError, StartupError},
    model::{check_len, Regressor},
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear {
        n_features: usize,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    DecisionTree {
        n_features: usize,
        #[serde(flatten)]
        tree: TreeArrays,
    },
    RandomForest {
        n_features: usize,
        trees: Vec<TreeArrays>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl ModelArtifact {
    /// Validate the artifact and turn it into a ready-to-run model.
    pub fn into_regressor(self, path: &Path) -> Result<Box<dyn Regressor>, StartupError> {
        let malformed = |reason: String| StartupError::ModelFormat {
            path: path.to_path_buf(),
            reason,
        };

        match self {
            ModelArtifact::Linear {
                n_features,
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(malformed(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }
                Ok(Box::new(LinearRegressor {
                    coefficients,
                    intercept,
                }))
            }
            ModelArtifact::DecisionTree { n_features, tree } => {
                let tree = RegressionTree::build(tree, n_features).map_err(malformed)?;
                Ok(Box::new(TreeRegressor { n_features, tree }))
            }
            ModelArtifact::RandomForest { n_features, trees } => {
                if trees.is_empty() {
                    return Err(malformed("forest has no trees".to_string()));
                }
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| {
                        RegressionTree::build(t, n_features)
                            .map_err(|reason| malformed(format!("tree {}: {}", i, reason)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(ForestRegressor { n_features, trees }))
            }
        }
    }
}

pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        check_len(x, self.coefficients.len())?;
        let dot: f64 = self.coefficients.iter().zip(x).map(|(w, v)| w * v).sum();
        Ok(dot + self.intercept)
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Validated tree. Children always point forward, so traversal terminates.
#[derive(Debug, Clone)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn build(arrays: TreeArrays, n_features: usize) -> Result<Self, String> {
        let n = arrays.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if arrays.children_right.len() != n
            || arrays.feature.len() != n
            || arrays.threshold.len() != n
            || arrays.value.len() != n
        {
            return Err("tree arrays differ in length".to_string());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (arrays.children_left[i], arrays.children_right[i]);
            if left == -1 {
                if right != -1 {
                    return Err(format!("node {} has a right child but no left child", i));
                }
                nodes.push(Node::Leaf(arrays.value[i]));
                continue;
            }

            let child = |c: i64| -> Result<usize, String> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| format!("node {} has invalid child {}", i, c))
            };
            let feature = usize::try_from(arrays.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| format!("node {} splits on feature {}", i, arrays.feature[i]))?;

            nodes.push(Node::Split {
                feature,
                threshold: arrays.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn predict_one(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

pub struct TreeRegressor {
    n_features: usize,
    tree: RegressionTree,
}

impl Regressor for TreeRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        check_len(x, self.n_features)?;
        Ok(self.tree.predict_one(x))
    }
}

/// Mean of the member trees.
pub struct ForestRegressor {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl Regressor for ForestRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        check_len(x, self.n_features)?;
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(x)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
