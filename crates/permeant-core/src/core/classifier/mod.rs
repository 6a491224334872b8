//! # Classifier Module
//!
//! The pre-trained tree-ensemble model that turns a fingerprint into a BBB permeability
//! probability.
//!
//! ## Overview
//!
//! - [`forest`] - JSON-serialized random forest of flat-array decision trees
//! - [`training`] - CART fitting, used only to build the synthetic fallback model
//!
//! [`Classifier::load`] reads a trained model once at startup. When the model is missing
//! or unreadable it can fall back to a forest fitted on random data with a fixed seed;
//! such a model is flagged as [`ModelProvenance::SyntheticFallback`] and its predictions
//! must never be mistaken for real scores.

pub mod forest;
pub mod training;

use crate::core::fingerprint::Fingerprint;
use forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Model expects {expected} features, got {found}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("No model is loaded")]
    NotLoaded,
}

/// Where the loaded model came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelProvenance {
    Trained { path: PathBuf, version: String },
    SyntheticFallback { seed: u64 },
}

impl ModelProvenance {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::SyntheticFallback { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    model: Option<(RandomForest, ModelProvenance)>,
}

impl Classifier {
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    pub fn trained(forest: RandomForest, path: PathBuf) -> Self {
        let provenance = ModelProvenance::Trained {
            path,
            version: forest.version.clone(),
        };
        Self {
            model: Some((forest, provenance)),
        }
    }

    pub fn synthetic(n_features: usize, seed: u64) -> Self {
        Self {
            model: Some((
                training::synthetic_fallback(n_features, seed),
                ModelProvenance::SyntheticFallback { seed },
            )),
        }
    }

    /// Loads the model at `path`, which must accept `n_features` inputs. Without a usable
    /// file the classifier is either the synthetic fallback or unloaded.
    pub fn load(path: &Path, n_features: usize, allow_fallback: bool) -> Self {
        let loaded = RandomForest::load(path).and_then(|forest| {
            if forest.n_features == n_features {
                Ok(forest)
            } else {
                Err(ModelError::FeatureMismatch {
                    expected: n_features,
                    found: forest.n_features,
                })
            }
        });

        match loaded {
            Ok(forest) => {
                info!(
                    path = %path.display(),
                    version = %forest.version,
                    trees = forest.trees.len(),
                    "Classifier model loaded"
                );
                Self::trained(forest, path.to_path_buf())
            }
            Err(e) if allow_fallback => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Model unavailable; using synthetic fallback model. Predictions are not meaningful."
                );
                Self::synthetic(n_features, training::FALLBACK_SEED)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model unavailable; predictions disabled");
                Self::unloaded()
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn provenance(&self) -> Option<&ModelProvenance> {
        self.model.as_ref().map(|(_, p)| p)
    }

    pub fn version(&self) -> Option<&str> {
        self.model.as_ref().map(|(f, _)| f.version.as_str())
    }

    pub fn forest(&self) -> Option<&RandomForest> {
        self.model.as_ref().map(|(f, _)| f)
    }

    /// Probability of the permeable class.
    pub fn predict(&self, fingerprint: &Fingerprint) -> Result<f64, ModelError> {
        let (forest, _) = self.model.as_ref().ok_or(ModelError::NotLoaded)?;
        forest.predict_proba(&fingerprint.to_features())
    }

    pub fn feature_importance(&self, top_n: usize) -> Vec<(usize, f64)> {
        self.forest()
            .map(|f| f.feature_importance(top_n))
            .unwrap_or_default()
    }
}
