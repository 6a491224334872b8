use crate::core::alerts::AlertScanner;
use crate::core::applicability::ReferenceSet;
use crate::core::classifier::{Classifier, ModelError};
use crate::core::descriptors::{DescriptorEngine, DescriptorSet};
use crate::core::fingerprint::{Fingerprint, FingerprintEngine, FingerprintParams, content_hash};
use crate::core::io::smiles;
use crate::core::models::molecule::Molecule;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::result::{PredictionClass, PredictionResult, Status, certainty};
use tracing::{debug, error, info, instrument, warn};

/// Owns every read-only resource needed to score a molecule.
///
/// Built once, then shared by reference; concurrent calls to the scoring methods are safe.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    descriptors: DescriptorEngine,
    alerts: AlertScanner,
    fingerprints: FingerprintEngine,
    reference: ReferenceSet,
    classifier: Classifier,
}

impl ScoringPipeline {
    /// Loads the model, alert catalogs and reference set described by `config`.
    ///
    /// Each file-backed resource degrades on its own when unavailable: the classifier
    /// falls back or unloads, a catalog counts zero, the reference set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only for invalid parameters or a descriptor table that
    /// fails to compile.
    #[instrument(skip_all, name = "pipeline_initialize")]
    pub fn initialize(config: &PipelineConfig) -> Result<Self, EngineError> {
        config.fingerprint.validate()?;

        // === Phase 1: Compile descriptor and alert patterns ===
        let descriptors = DescriptorEngine::new()?;
        let alerts = AlertScanner::load(
            config.pains_catalog_path.as_deref(),
            config.brenk_catalog_path.as_deref(),
        );

        // === Phase 2: Reference fingerprints ===
        let reference = ReferenceSet::load_or_empty(&config.reference_path, config.fingerprint);

        // === Phase 3: Classifier ===
        let classifier = Classifier::load(
            &config.model_path,
            config.fingerprint.n_bits,
            config.allow_synthetic_fallback,
        );

        info!(
            radius = config.fingerprint.radius,
            n_bits = config.fingerprint.n_bits,
            model_loaded = classifier.is_loaded(),
            reference_size = reference.len(),
            "Scoring pipeline ready"
        );

        Self::from_parts(descriptors, alerts, reference, classifier, config.fingerprint)
    }

    /// Assembles a pipeline from components that are already built.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fingerprint`] when `params` cannot produce a fingerprint.
    pub fn from_parts(
        descriptors: DescriptorEngine,
        alerts: AlertScanner,
        reference: ReferenceSet,
        classifier: Classifier,
        params: FingerprintParams,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self::assemble(descriptors, alerts, reference, classifier, params))
    }

    /// Same as [`ScoringPipeline::from_parts`] without checking `params`.
    pub(crate) fn assemble(
        descriptors: DescriptorEngine,
        alerts: AlertScanner,
        reference: ReferenceSet,
        classifier: Classifier,
        params: FingerprintParams,
    ) -> Self {
        if reference.params() != params {
            warn!("Reference set was built with different fingerprint parameters; applicability scores will be null");
        }
        Self {
            descriptors,
            alerts,
            fingerprints: FingerprintEngine::new(params),
            reference,
            classifier,
        }
    }

    pub fn fingerprint_params(&self) -> FingerprintParams {
        self.fingerprints.params()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn alert_scanner(&self) -> &AlertScanner {
        &self.alerts
    }

    pub fn reference_set(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn score(&self, smiles: &str) -> PredictionResult {
        self.score_named(smiles, None)
    }

    /// Scores one SMILES string. `molecule_name` is copied to the result untouched.
    #[instrument(level = "debug", skip(self, molecule_name), name = "score")]
    pub fn score_named(&self, smiles: &str, molecule_name: Option<String>) -> PredictionResult {
        let mut result = PredictionResult::new(smiles, molecule_name);

        if smiles.trim().is_empty() {
            debug!("Empty SMILES input");
            return reject(result, Status::EmptySmiles, "Empty SMILES string.".to_string());
        }

        let mol = match smiles::parse(smiles.trim()) {
            Ok(mol) => mol,
            Err(e) => {
                debug!(error = %e, "SMILES rejected");
                return reject(result, Status::InvalidSmiles, format!("Invalid SMILES string: {e}"));
            }
        };

        result.descriptors = self.describe(&mol);
        result.fingerprint_hash = match content_hash(&mol) {
            Ok(hash) => Some(hash),
            Err(e) => {
                warn!(smiles, error = %e, "Could not compute content hash");
                None
            }
        };

        let fingerprint = match self.fingerprints.try_compute(&mol) {
            Ok(fp) => fp,
            Err(e) => {
                debug!(error = %e, "Fingerprint generation failed");
                return reject(
                    result,
                    Status::FingerprintGenerationFailed,
                    format!("Failed to generate fingerprint for the molecule: {e}"),
                );
            }
        };

        if !self.classifier.is_loaded() {
            error!("Model not loaded, cannot perform prediction");
            return reject(
                result,
                Status::ModelNotLoaded,
                "Prediction model is not available.".to_string(),
            );
        }
        result.model_version = self.classifier.version().map(str::to_owned);

        match self.predict(&fingerprint) {
            Ok(probability) => {
                result.status = Status::Success;
                result.bbb_probability = probability;
                result.prediction_class = PredictionClass::from_probability(probability);
                result.prediction_certainty = certainty(probability);
                result.applicability_score = self.reference.score(Some(&fingerprint));
                result.fingerprint_features = Some(fingerprint.to_dense());
                debug!(probability, class = %result.prediction_class, "Scored");
                result
            }
            Err(e) => {
                error!(smiles, error = %e, "Prediction pipeline fault");
                fault(result, format!("Internal error during prediction pipeline: {e}"))
            }
        }
    }

    pub fn score_many<S: AsRef<str>>(&self, smiles: &[S]) -> Vec<PredictionResult> {
        self.score_many_with_progress(smiles, &ProgressReporter::new())
    }

    /// Scores each entry independently; the output has one result per input, in order.
    #[instrument(skip_all, name = "score_many", fields(count = smiles.len()))]
    pub fn score_many_with_progress<S: AsRef<str>>(
        &self,
        smiles: &[S],
        reporter: &ProgressReporter,
    ) -> Vec<PredictionResult> {
        reporter.report(Progress::PhaseStart { name: "Scoring" });
        reporter.report(Progress::TaskStart {
            total_steps: smiles.len() as u64,
        });

        let results: Vec<PredictionResult> = smiles
            .iter()
            .enumerate()
            .map(|(index, s)| {
                let result = self.score(s.as_ref());
                if !result.is_success() {
                    reporter.report(Progress::ItemFailed {
                        index,
                        status: result.status,
                    });
                }
                reporter.report(Progress::TaskIncrement);
                result
            })
            .collect();

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        results
    }

    fn describe(&self, mol: &Molecule) -> DescriptorSet {
        let mut descriptors = self.descriptors.compute(Some(mol));
        let counts = self.alerts.scan(Some(mol));
        descriptors.pains_alerts = counts.pains;
        descriptors.brenk_alerts = counts.brenk;
        descriptors
    }

    fn predict(&self, fingerprint: &Fingerprint) -> Result<f64, ModelError> {
        let probability = self.classifier.predict(fingerprint)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::InvalidModel(format!(
                "probability {probability} is outside [0, 1]"
            )));
        }
        Ok(probability)
    }
}

/// Input and availability failures keep the placeholder prediction fields.
fn reject(mut result: PredictionResult, status: Status, message: String) -> PredictionResult {
    result.status = status;
    result.error = Some(message);
    result
}

fn fault(mut result: PredictionResult, message: String) -> PredictionResult {
    result.status = Status::PipelineExecutionError;
    result.error = Some(message);
    result.bbb_probability = 0.0;
    result.prediction_class = PredictionClass::Unknown;
    result.prediction_certainty = 0.0;
    result.applicability_score = None;
    result.fingerprint_features = None;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::forest::{DecisionTree, Node, RandomForest};
    use std::path::PathBuf;
    use std::sync::Mutex;

    const ASPIRIN: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";

    fn constant_forest(n_features: usize, probability: f64) -> RandomForest {
        RandomForest {
            version: "test-constant".to_string(),
            n_features,
            trees: vec![DecisionTree {
                nodes: vec![Node::Leaf { probability }],
            }],
        }
    }

    fn pipeline_with(classifier: Classifier, reference: &[&str]) -> ScoringPipeline {
        let params = FingerprintParams::default();
        ScoringPipeline::from_parts(
            DescriptorEngine::new().unwrap(),
            AlertScanner::builtin(),
            ReferenceSet::from_smiles(reference, params),
            classifier,
            params,
        )
        .unwrap()
    }

    fn pipeline(probability: f64) -> ScoringPipeline {
        let forest = constant_forest(FingerprintParams::default().n_bits, probability);
        pipeline_with(
            Classifier::trained(forest, PathBuf::from("test.json")),
            &["CCO", "c1ccccc1"],
        )
    }

    #[test]
    fn pipeline_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScoringPipeline>();
    }

    mod single {
        use super::*;

        #[test]
        fn aspirin_scores_successfully_with_known_descriptors() {
            let result = pipeline(0.8).score(ASPIRIN);

            assert_eq!(result.status, Status::Success);
            assert_eq!(result.error, None);
            let d = &result.descriptors;
            assert!((d.mw.unwrap() - 180.16).abs() < 0.01);
            assert_eq!(d.rot_bonds, Some(2));
            assert_eq!(d.h_donors, Some(1));
            assert_eq!(d.h_acceptors, Some(3));
            assert_eq!(d.mol_formula.as_deref(), Some("C9H8O4"));
            assert_eq!(d.lipinski_passes, Some(true));
            assert_eq!(d.pains_alerts, 0);
            assert_eq!(result.model_version.as_deref(), Some("test-constant"));
        }

        #[test]
        fn success_fields_follow_probability() {
            let result = pipeline(0.8).score("CCO");
            assert_eq!(result.status, Status::Success);
            assert!((result.bbb_probability - 0.8).abs() < 1e-12);
            assert_eq!(result.prediction_class, PredictionClass::Permeable);
            assert!((result.prediction_certainty - 0.6).abs() < 1e-9);
            assert_eq!(result.applicability_score, Some(1.0));
            assert_eq!(result.fingerprint_features.as_ref().map(Vec::len), Some(2048));
            assert_eq!(result.fingerprint_hash.as_ref().map(String::len), Some(64));

            let negative = pipeline(0.3).score("CCO");
            assert_eq!(negative.prediction_class, PredictionClass::NonPermeable);
        }

        #[test]
        fn applicability_score_is_bounded() {
            let result = pipeline(0.5).score(ASPIRIN);
            let score = result.applicability_score.unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert!(score < 1.0);
        }

        #[test]
        fn empty_input_keeps_placeholder_prediction() {
            for input in ["", "   "] {
                let result = pipeline(0.8).score(input);
                assert_eq!(result.status, Status::EmptySmiles);
                assert_eq!(result.bbb_probability, 0.0);
                assert_eq!(result.prediction_class, PredictionClass::NonPermeable);
                assert_eq!(result.prediction_certainty, 0.0);
                assert_eq!(result.descriptors, DescriptorSet::default());
                assert!(result.error.is_some());
            }
        }

        #[test]
        fn invalid_input_has_no_descriptors() {
            let result = pipeline(0.8).score("INVALID_SMILES_123");
            assert_eq!(result.status, Status::InvalidSmiles);
            assert_eq!(result.prediction_class, PredictionClass::NonPermeable);
            assert_eq!(result.descriptors, DescriptorSet::default());
            assert_eq!(result.descriptors.mw, None);
            assert_eq!(result.fingerprint_hash, None);
            assert!(result.status.is_client_error());
        }

        #[test]
        fn unloaded_model_still_reports_descriptors() {
            let result = pipeline_with(Classifier::unloaded(), &[]).score("CCO");
            assert_eq!(result.status, Status::ModelNotLoaded);
            assert!(result.descriptors.mw.is_some());
            assert!(result.fingerprint_hash.is_some());
            assert_eq!(result.prediction_class, PredictionClass::NonPermeable);
            assert_eq!(result.model_version, None);
            assert_eq!(result.fingerprint_features, None);
        }

        #[test]
        fn fingerprint_failure_keeps_descriptors_and_placeholders() {
            let params = FingerprintParams {
                radius: 2,
                n_bits: 0,
            };
            let pipeline = ScoringPipeline::assemble(
                DescriptorEngine::new().unwrap(),
                AlertScanner::builtin(),
                ReferenceSet::empty(params),
                Classifier::trained(constant_forest(16, 0.9), PathBuf::from("m.json")),
                params,
            );
            let result = pipeline.score("CCO");

            assert_eq!(result.status, Status::FingerprintGenerationFailed);
            assert!(result.descriptors.mw.is_some());
            assert!(result.fingerprint_hash.is_some());
            assert_eq!(result.bbb_probability, 0.0);
            assert_eq!(result.prediction_class, PredictionClass::NonPermeable);
            assert_eq!(result.fingerprint_features, None);
            assert_eq!(result.model_version, None);
            assert!(
                result
                    .error
                    .as_deref()
                    .is_some_and(|e| e.starts_with("Failed to generate fingerprint"))
            );
        }

        #[test]
        fn model_fault_marks_class_unknown() {
            let mismatched = constant_forest(16, 0.9);
            let result = pipeline_with(
                Classifier::trained(mismatched, PathBuf::from("bad.json")),
                &["CCO"],
            )
            .score("CCO");

            assert_eq!(result.status, Status::PipelineExecutionError);
            assert_eq!(result.prediction_class, PredictionClass::Unknown);
            assert_eq!(result.bbb_probability, 0.0);
            assert_eq!(result.applicability_score, None);
            assert!(result.descriptors.mw.is_some());
            assert!(!result.status.is_client_error());
        }

        #[test]
        fn molecule_name_passes_through() {
            let result = pipeline(0.8).score_named("CCO", Some("ethanol".to_string()));
            assert_eq!(result.molecule_name.as_deref(), Some("ethanol"));
            assert_eq!(result.smiles, "CCO");
        }

        #[test]
        fn long_chain_scores_without_exhausting_the_stack() {
            let smiles = "C".repeat(20_000);
            let result = pipeline(0.8).score(&smiles);
            assert_eq!(result.status, Status::Success);
            assert_eq!(result.descriptors.heavy_atoms, Some(20_000));
            assert_eq!(result.fingerprint_hash.as_ref().map(String::len), Some(64));
        }

        #[test]
        fn unkekulizable_aromatic_ring_is_invalid() {
            let result = pipeline(0.8).score("c1cccc1");
            assert_eq!(result.status, Status::InvalidSmiles);
            assert_eq!(result.descriptors.mw, None);
        }

        #[test]
        fn title_after_whitespace_is_ignored() {
            let p = pipeline(0.8);
            let titled = p.score("CCO ethanol");
            assert_eq!(titled.status, Status::Success);
            assert_eq!(titled.fingerprint_hash, p.score("CCO").fingerprint_hash);
            assert_eq!(titled.smiles, "CCO ethanol");
        }

        #[test]
        fn equivalent_spellings_share_hash() {
            let p = pipeline(0.8);
            let a = p.score("CCO");
            let b = p.score("OCC");
            assert_eq!(a.fingerprint_hash, b.fingerprint_hash);
            assert_eq!(a.fingerprint_features, b.fingerprint_features);
            assert_eq!(a.descriptors.mol_formula, b.descriptors.mol_formula);
        }
    }

    mod alerts {
        use super::*;

        #[test]
        fn benzoquinone_hits_both_catalogs() {
            let result = pipeline(0.5).score("O=C1C=CC(=O)C=C1");
            assert_eq!(result.status, Status::Success);
            assert!(result.descriptors.pains_alerts > 0);
            assert!(result.descriptors.brenk_alerts > 0);
        }

        #[test]
        fn propylene_oxide_hits_only_brenk() {
            let result = pipeline(0.5).score("C1OC1C");
            assert_eq!(result.descriptors.pains_alerts, 0);
            assert!(result.descriptors.brenk_alerts > 0);
        }
    }

    mod batch {
        use super::*;

        #[test]
        fn results_correspond_to_inputs_by_index() {
            let results = pipeline(0.8).score_many(&["CCO", "INVALID", "CC(=O)O", ""]);
            let statuses: Vec<Status> = results.iter().map(|r| r.status).collect();
            assert_eq!(
                statuses,
                vec![
                    Status::Success,
                    Status::InvalidSmiles,
                    Status::Success,
                    Status::EmptySmiles
                ]
            );
            assert_eq!(results[2].smiles, "CC(=O)O");
        }

        #[test]
        fn progress_reports_each_item_and_failures() {
            let events = Mutex::new(Vec::new());
            let reporter = ProgressReporter::with_callback(Box::new(|e| {
                events.lock().unwrap().push(e);
            }));
            let inputs = vec!["CCO".to_string(), "C1CC".to_string()];
            let results = pipeline(0.8).score_many_with_progress(&inputs, &reporter);
            drop(reporter);

            assert_eq!(results.len(), 2);
            let events = events.into_inner().unwrap();
            assert!(events.contains(&Progress::TaskStart { total_steps: 2 }));
            assert_eq!(
                events
                    .iter()
                    .filter(|e| **e == Progress::TaskIncrement)
                    .count(),
                2
            );
            assert!(events.contains(&Progress::ItemFailed {
                index: 1,
                status: Status::InvalidSmiles,
            }));
            assert_eq!(events.last(), Some(&Progress::PhaseFinish));
        }

        #[test]
        fn empty_batch_yields_no_results() {
            let results = pipeline(0.8).score_many::<&str>(&[]);
            assert!(results.is_empty());
        }
    }

    mod initialization {
        use super::*;
        use crate::engine::config::PipelineConfigBuilder;
        use tempfile::tempdir;

        #[test]
        fn missing_files_degrade_to_unloaded_model_and_empty_reference() {
            let dir = tempdir().unwrap();
            let config = PipelineConfigBuilder::new()
                .model_path(dir.path().join("missing.json"))
                .reference_path(dir.path().join("missing.csv"))
                .allow_synthetic_fallback(false)
                .build()
                .unwrap();

            let pipeline = ScoringPipeline::initialize(&config).unwrap();
            assert!(!pipeline.classifier().is_loaded());
            assert!(pipeline.reference_set().is_empty());
            assert!(pipeline.alert_scanner().pains().is_some());

            let result = pipeline.score("CCO");
            assert_eq!(result.status, Status::ModelNotLoaded);
            assert_eq!(result.applicability_score, None);
        }

        #[test]
        fn saved_model_and_reference_file_are_used() {
            let dir = tempdir().unwrap();
            let model_path = dir.path().join("model.json");
            let reference_path = dir.path().join("train.csv");
            let params = FingerprintParams {
                radius: 2,
                n_bits: 256,
            };
            constant_forest(params.n_bits, 0.25).save(&model_path).unwrap();
            std::fs::write(&reference_path, "smiles,label\nCCO,1\nCCCC,0\n").unwrap();

            let config = PipelineConfigBuilder::new()
                .fingerprint_bits(params.n_bits)
                .model_path(model_path)
                .reference_path(reference_path)
                .build()
                .unwrap();
            let pipeline = ScoringPipeline::initialize(&config).unwrap();
            assert_eq!(pipeline.reference_set().len(), 2);
            assert!(!pipeline.classifier().provenance().unwrap().is_synthetic());

            let result = pipeline.score("CCO");
            assert_eq!(result.status, Status::Success);
            assert_eq!(result.prediction_class, PredictionClass::NonPermeable);
            assert_eq!(result.applicability_score, Some(1.0));
            assert_eq!(result.fingerprint_features.map(|f| f.len()), Some(256));
        }

        #[test]
        fn zero_bits_fail_from_parts() {
            let params = FingerprintParams {
                radius: 2,
                n_bits: 0,
            };
            let result = ScoringPipeline::from_parts(
                DescriptorEngine::new().unwrap(),
                AlertScanner::default(),
                ReferenceSet::empty(FingerprintParams::default()),
                Classifier::unloaded(),
                params,
            );
            assert!(matches!(result, Err(EngineError::Fingerprint { .. })));
        }
    }
}
