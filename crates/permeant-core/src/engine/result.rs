use crate::core::descriptors::DescriptorSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of one scoring call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "error_empty_smiles")]
    EmptySmiles,
    #[serde(rename = "error_invalid_smiles")]
    InvalidSmiles,
    #[serde(rename = "error_fingerprint_generation")]
    FingerprintGenerationFailed,
    #[serde(rename = "error_model_not_loaded")]
    ModelNotLoaded,
    #[serde(rename = "error_pipeline_execution")]
    PipelineExecutionError,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::EmptySmiles => "error_empty_smiles",
            Self::InvalidSmiles => "error_invalid_smiles",
            Self::FingerprintGenerationFailed => "error_fingerprint_generation",
            Self::ModelNotLoaded => "error_model_not_loaded",
            Self::PipelineExecutionError => "error_pipeline_execution",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failures caused by the input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptySmiles | Self::InvalidSmiles)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionClass {
    Permeable,
    /// Also the placeholder for calls that never reached the model.
    #[default]
    NonPermeable,
    /// Marks a processing fault; never a real prediction.
    Unknown,
}

impl PredictionClass {
    pub const THRESHOLD: f64 = 0.5;

    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::THRESHOLD {
            Self::Permeable
        } else {
            Self::NonPermeable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permeable => "permeable",
            Self::NonPermeable => "non_permeable",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PredictionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance of a probability from the decision threshold, scaled to `[0, 1]`.
pub fn certainty(probability: f64) -> f64 {
    ((probability - PredictionClass::THRESHOLD).abs() * 2.0).clamp(0.0, 1.0)
}

/// The record produced for every scoring call, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub smiles: String,
    pub molecule_name: Option<String>,
    pub status: Status,
    pub error: Option<String>,
    pub bbb_probability: f64,
    pub prediction_class: PredictionClass,
    pub prediction_certainty: f64,
    pub applicability_score: Option<f64>,
    pub fingerprint_hash: Option<String>,
    pub model_version: Option<String>,
    #[serde(flatten)]
    pub descriptors: DescriptorSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_features: Option<Vec<u8>>,
}

impl PredictionResult {
    /// A record with placeholder prediction fields and no descriptors.
    pub fn new(smiles: impl Into<String>, molecule_name: Option<String>) -> Self {
        Self {
            smiles: smiles.into(),
            molecule_name,
            status: Status::PipelineExecutionError,
            error: None,
            bbb_probability: 0.0,
            prediction_class: PredictionClass::NonPermeable,
            prediction_certainty: 0.0,
            applicability_score: None,
            fingerprint_hash: None,
            model_version: None,
            descriptors: DescriptorSet::default(),
            fingerprint_features: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub permeable: usize,
    pub non_permeable: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[PredictionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            if !result.is_success() {
                summary.failed += 1;
                continue;
            }
            summary.succeeded += 1;
            match result.prediction_class {
                PredictionClass::Permeable => summary.permeable += 1,
                PredictionClass::NonPermeable => summary.non_permeable += 1,
                PredictionClass::Unknown => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_boundary_is_inclusive_at_half() {
        assert_eq!(PredictionClass::from_probability(0.5), PredictionClass::Permeable);
        assert_eq!(PredictionClass::from_probability(0.4999), PredictionClass::NonPermeable);
        assert_eq!(PredictionClass::from_probability(1.0), PredictionClass::Permeable);
    }

    #[test]
    fn certainty_scales_distance_from_threshold() {
        assert_eq!(certainty(0.5), 0.0);
        assert_eq!(certainty(1.0), 1.0);
        assert_eq!(certainty(0.0), 1.0);
        assert!((certainty(0.8) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn status_serializes_as_wire_string() {
        for status in [
            Status::Success,
            Status::EmptySmiles,
            Status::InvalidSmiles,
            Status::FingerprintGenerationFailed,
            Status::ModelNotLoaded,
            Status::PipelineExecutionError,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn only_input_failures_are_client_errors() {
        assert!(Status::EmptySmiles.is_client_error());
        assert!(Status::InvalidSmiles.is_client_error());
        assert!(!Status::ModelNotLoaded.is_client_error());
        assert!(!Status::PipelineExecutionError.is_client_error());
        assert!(!Status::Success.is_client_error());
    }

    #[test]
    fn result_flattens_descriptors_and_omits_absent_features() {
        let result = PredictionResult::new("CCO", Some("ethanol".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["smiles"], "CCO");
        assert_eq!(json["molecule_name"], "ethanol");
        assert_eq!(json["prediction_class"], "non_permeable");
        assert!(json.get("mw").is_some());
        assert_eq!(json["gi_absorption"], "N/A");
        assert!(json.get("fingerprint_features").is_none());
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut permeable = PredictionResult::new("CCO", None);
        permeable.status = Status::Success;
        permeable.prediction_class = PredictionClass::Permeable;
        let mut negative = permeable.clone();
        negative.prediction_class = PredictionClass::NonPermeable;
        let mut failed = PredictionResult::new("", None);
        failed.status = Status::EmptySmiles;

        let summary = BatchSummary::from_results(&[permeable, negative, failed]);
        assert_eq!(
            summary,
            BatchSummary {
                total: 3,
                succeeded: 2,
                failed: 1,
                permeable: 1,
                non_permeable: 1,
            }
        );
    }
}
