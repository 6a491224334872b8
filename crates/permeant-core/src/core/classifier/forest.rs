use super::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node of a binary decision tree, stored in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        /// Taken when `x[feature] <= threshold`.
        left: usize,
        right: usize,
        /// Weighted Gini decrease achieved by this split.
        #[serde(default)]
        impurity_decrease: f64,
    },
    Leaf {
        /// Probability of the positive ("permeable") class.
        probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { probability } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Children always point forward, so traversal terminates.
    fn validate(&self, tree: usize, n_features: usize) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidModel(format!("tree {tree}: {reason}"));
        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(invalid(format!("node {idx} splits on feature {feature}")));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {idx} has a non-finite threshold")));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(invalid(format!("node {idx} has child {child}")));
                        }
                    }
                }
                Node::Leaf { probability } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(invalid(format!("leaf {idx} has probability {probability}")));
                    }
                }
            }
        }
        Ok(())
    }

    /// Impurity decrease per feature, normalized to sum to one.
    fn feature_importances(&self, n_features: usize) -> Vec<f64> {
        let mut importances = vec![0.0; n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = *node
            {
                importances[feature] += impurity_decrease.max(0.0);
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        importances
    }
}

/// An ensemble of binary decision trees averaging leaf probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub version: String,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let forest: Self = serde_json::from_str(json).map_err(|e| ModelError::Json {
            path: String::new(),
            source: e,
        })?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let forest: Self = serde_json::from_str(&content).map_err(|e| ModelError::Json {
            path: path_str,
            source: e,
        })?;
        forest.validate()?;
        Ok(forest)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let path_str = path.to_string_lossy().to_string();
        let json = serde_json::to_string(self).map_err(|e| ModelError::Json {
            path: path_str.clone(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ModelError::Io {
            path: path_str,
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("forest has no trees".to_string()));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.validate(i, self.n_features))
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                found: features.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok((sum / self.trees.len() as f64).clamp(0.0, 1.0))
    }

    /// Mean-decrease-impurity importances, highest first, truncated to `top_n`.
    pub fn feature_importance(&self, top_n: usize) -> Vec<(usize, f64)> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (total, value) in totals
                .iter_mut()
                .zip(tree.feature_importances(self.n_features))
            {
                *total += value;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        let mut ranked: Vec<(usize, f64)> = totals
            .into_iter()
            .enumerate()
            .map(|(feature, total)| (feature, total / n_trees))
            .filter(|&(_, importance)| importance > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top_n);
        ranked
    }
}
