use crate::core::fingerprint::{DEFAULT_N_BITS, DEFAULT_RADIUS, FingerprintParams};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL_PATH: &str = "models/bbb_rf_model.json";
pub const DEFAULT_REFERENCE_PATH: &str = "data/training_dataset.csv";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub fingerprint: FingerprintParams,
    pub model_path: PathBuf,
    /// Trains the synthetic fallback model when `model_path` cannot be used.
    pub allow_synthetic_fallback: bool,
    pub reference_path: PathBuf,
    /// `None` uses the built-in PAINS catalog.
    pub pains_catalog_path: Option<PathBuf>,
    /// `None` uses the built-in Brenk catalog.
    pub brenk_catalog_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fingerprint: FingerprintParams::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            allow_synthetic_fallback: true,
            reference_path: PathBuf::from(DEFAULT_REFERENCE_PATH),
            pains_catalog_path: None,
            brenk_catalog_path: None,
        }
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    fingerprint_radius: Option<u32>,
    fingerprint_bits: Option<usize>,
    model_path: Option<PathBuf>,
    allow_synthetic_fallback: Option<bool>,
    reference_path: Option<PathBuf>,
    pains_catalog_path: Option<PathBuf>,
    brenk_catalog_path: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint_radius(mut self, radius: u32) -> Self {
        self.fingerprint_radius = Some(radius);
        self
    }
    pub fn fingerprint_bits(mut self, n_bits: usize) -> Self {
        self.fingerprint_bits = Some(n_bits);
        self
    }
    pub fn model_path(mut self, path: PathBuf) -> Self {
        self.model_path = Some(path);
        self
    }
    pub fn allow_synthetic_fallback(mut self, allow: bool) -> Self {
        self.allow_synthetic_fallback = Some(allow);
        self
    }
    pub fn reference_path(mut self, path: PathBuf) -> Self {
        self.reference_path = Some(path);
        self
    }
    pub fn pains_catalog_path(mut self, path: Option<PathBuf>) -> Self {
        self.pains_catalog_path = path;
        self
    }
    pub fn brenk_catalog_path(mut self, path: Option<PathBuf>) -> Self {
        self.brenk_catalog_path = path;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let n_bits = self.fingerprint_bits.unwrap_or(DEFAULT_N_BITS);
        if n_bits == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "fingerprint_bits",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(PipelineConfig {
            fingerprint: FingerprintParams {
                radius: self.fingerprint_radius.unwrap_or(DEFAULT_RADIUS),
                n_bits,
            },
            model_path: self
                .model_path
                .ok_or(ConfigError::MissingParameter("model_path"))?,
            allow_synthetic_fallback: self.allow_synthetic_fallback.unwrap_or(true),
            reference_path: self
                .reference_path
                .ok_or(ConfigError::MissingParameter("reference_path"))?,
            pains_catalog_path: self.pains_catalog_path,
            brenk_catalog_path: self.brenk_catalog_path,
        })
    }
}
