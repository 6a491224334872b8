use permeant::core::fingerprint::{DEFAULT_N_BITS, DEFAULT_RADIUS};
use permeant::engine::config::{DEFAULT_MODEL_PATH, DEFAULT_REFERENCE_PATH};

pub struct DefaultsConfig {
    pub radius: u32,
    pub n_bits: usize,
    pub model_path: String,
    pub allow_synthetic_fallback: bool,
    pub reference_path: String,
    pub max_batch_size: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            n_bits: DEFAULT_N_BITS,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            allow_synthetic_fallback: true,
            reference_path: DEFAULT_REFERENCE_PATH.to_string(),
            max_batch_size: 10_000,
        }
    }
}
