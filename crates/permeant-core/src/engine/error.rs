use thiserror::Error;

use super::config::ConfigError;
use crate::core::fingerprint::FingerprintError;
use crate::core::smarts::SmartsError;

/// Failures that prevent a pipeline from being constructed.
///
/// Scoring itself never fails; see [`Status`](super::result::Status).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid fingerprint parameters: {source}")]
    Fingerprint {
        #[from]
        source: FingerprintError,
    },

    #[error("Descriptor typing table failed to compile: {source}")]
    DescriptorTable {
        #[from]
        source: SmartsError,
    },

    #[error("Initialization failed: {0}")]
    Initialization(String),
}
