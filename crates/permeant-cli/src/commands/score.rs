use crate::cli::ScoreArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::output;
use permeant::engine::result::PredictionResult;
use permeant::workflows::score::ScoringPipeline;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: ScoreArgs, config_path: Option<&Path>) -> Result<()> {
    let config = build_config(config_path, &args.pipeline, None)?;
    let pipeline = ScoringPipeline::initialize(&config.pipeline)?;
    warn_if_synthetic(&pipeline);

    let results = score_all(&pipeline, &args.smiles, args.name.as_deref(), args.features);
    info!("Scored {} molecule(s).", results.len());

    println!("{}", output::render_json(&results, args.pretty)?);
    Ok(())
}

pub fn score_all(
    pipeline: &ScoringPipeline,
    smiles: &[String],
    name: Option<&str>,
    keep_features: bool,
) -> Vec<PredictionResult> {
    smiles
        .iter()
        .map(|s| {
            let mut result = pipeline.score_named(s, name.map(str::to_owned));
            if !keep_features {
                result.fingerprint_features = None;
            }
            result
        })
        .collect()
}

pub(crate) fn warn_if_synthetic(pipeline: &ScoringPipeline) {
    if pipeline
        .classifier()
        .provenance()
        .is_some_and(|p| p.is_synthetic())
    {
        warn!("Using the synthetic fallback model; probabilities are not meaningful.");
        eprintln!("Warning: no trained model was found; predictions come from a synthetic fallback model.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permeant::engine::config::PipelineConfigBuilder;
    use permeant::engine::result::Status;
    use tempfile::tempdir;

    fn unloaded_pipeline() -> ScoringPipeline {
        let dir = tempdir().unwrap();
        let config = PipelineConfigBuilder::new()
            .model_path(dir.path().join("none.json"))
            .reference_path(dir.path().join("none.csv"))
            .allow_synthetic_fallback(false)
            .build()
            .unwrap();
        ScoringPipeline::initialize(&config).unwrap()
    }

    #[test]
    fn every_input_gets_a_result_in_order() {
        let pipeline = unloaded_pipeline();
        let inputs = vec!["CCO".to_string(), "not smiles".to_string(), String::new()];
        let results = score_all(&pipeline, &inputs, Some("x"), false);

        let statuses: Vec<Status> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![Status::ModelNotLoaded, Status::InvalidSmiles, Status::EmptySmiles]
        );
        assert!(results.iter().all(|r| r.molecule_name.as_deref() == Some("x")));
        assert!(results.iter().all(|r| r.fingerprint_features.is_none()));
    }
}
