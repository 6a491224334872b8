use crate::cli::BatchArgs;
use crate::commands::score::warn_if_synthetic;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::output;
use crate::utils::progress::CliProgressHandler;
use permeant::engine::progress::{Progress, ProgressReporter};
use permeant::engine::result::{BatchSummary, PredictionResult};
use permeant::workflows::score::ScoringPipeline;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, instrument};

const SMILES_COLUMN: &str = "smiles";
const NAME_COLUMN: &str = "molecule_name";

/// One input row. Empty cells are kept so the output stays aligned with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub smiles: String,
    pub molecule_name: Option<String>,
}

pub fn run(args: BatchArgs, config_path: Option<&Path>) -> Result<()> {
    let config = build_config(config_path, &args.pipeline, args.max_batch_size)?;

    info!("Reading input rows from {:?}", &args.input);
    let rows = read_rows(&args.input)?;
    if rows.len() > config.max_batch_size {
        return Err(CliError::Argument(format!(
            "Input has {} rows, more than the maximum batch size of {}.",
            rows.len(),
            config.max_batch_size
        )));
    }

    let pipeline = ScoringPipeline::initialize(&config.pipeline)?;
    warn_if_synthetic(&pipeline);

    let progress_handler = if args.no_progress {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Scoring {} molecule(s)...", rows.len());
    let results = score_rows(&pipeline, &rows, &reporter);
    info!(failed = progress_handler.failed_count(), "Batch scoring finished");

    info!("Writing results to {:?}", &args.output);
    let file = File::create(&args.output)?;
    output::write_csv(BufWriter::new(file), &results)?;

    let summary = BatchSummary::from_results(&results);
    println!("{}", output::format_summary(&summary));
    println!("Results written to: {}", args.output.display());
    Ok(())
}

/// Reads a CSV with a `smiles` header column and an optional `molecule_name` column.
pub fn read_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let smiles_idx = headers
        .iter()
        .position(|h| h == SMILES_COLUMN)
        .ok_or_else(|| {
            CliError::Argument(format!(
                "Input file '{}' must contain a '{}' column.",
                path.display(),
                SMILES_COLUMN
            ))
        })?;
    let name_idx = headers.iter().position(|h| h == NAME_COLUMN);

    reader
        .records()
        .map(|record| -> Result<InputRow> {
            let record = record?;
            Ok(InputRow {
                smiles: record.get(smiles_idx).unwrap_or_default().to_string(),
                molecule_name: name_idx
                    .and_then(|i| record.get(i))
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned),
            })
        })
        .collect()
}

/// Scores rows on the rayon pool. Results keep the input order.
#[instrument(skip_all, name = "batch_scoring", fields(rows = rows.len()))]
pub fn score_rows(
    pipeline: &ScoringPipeline,
    rows: &[InputRow],
    reporter: &ProgressReporter,
) -> Vec<PredictionResult> {
    reporter.report(Progress::PhaseStart { name: "Scoring" });
    reporter.report(Progress::TaskStart {
        total_steps: rows.len() as u64,
    });

    let mut results: Vec<PredictionResult> = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| {
            let result = pipeline.score_named(&row.smiles, row.molecule_name.clone());
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

    for result in &mut results {
        result.fingerprint_features = None;
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use permeant::core::classifier::forest::{DecisionTree, Node, RandomForest};
    use permeant::engine::config::PipelineConfigBuilder;
    use permeant::engine::result::{PredictionClass, Status};
    use std::fs;
    use tempfile::tempdir;

    fn pipeline_with_constant_model(dir: &Path, probability: f64) -> ScoringPipeline {
        let model_path = dir.join("model.json");
        RandomForest {
            version: "constant".to_string(),
            n_features: 256,
            trees: vec![DecisionTree {
                nodes: vec![Node::Leaf { probability }],
            }],
        }
        .save(&model_path)
        .unwrap();

        let config = PipelineConfigBuilder::new()
            .fingerprint_bits(256)
            .model_path(model_path)
            .reference_path(dir.join("missing.csv"))
            .build()
            .unwrap();
        ScoringPipeline::initialize(&config).unwrap()
    }

    #[test]
    fn rows_keep_empty_cells_and_optional_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(
            &path,
            "id,smiles,molecule_name\n1,CCO,ethanol\n2,,\n3, CC(=O)O ,\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].molecule_name.as_deref(), Some("ethanol"));
        assert_eq!(rows[1].smiles, "");
        assert_eq!(rows[1].molecule_name, None);
        assert_eq!(rows[2].smiles, "CC(=O)O");
    }

    #[test]
    fn missing_smiles_column_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "structure\nCCO\n").unwrap();
        assert!(matches!(read_rows(&path), Err(CliError::Argument(_))));
    }

    #[test]
    fn missing_input_file_is_a_csv_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_rows(&dir.path().join("absent.csv")),
            Err(CliError::Csv(_))
        ));
    }

    #[test]
    fn parallel_scoring_preserves_input_order() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with_constant_model(dir.path(), 0.9);
        let rows: Vec<InputRow> = ["CCO", "INVALID", "CC(=O)O", ""]
            .iter()
            .map(|s| InputRow {
                smiles: s.to_string(),
                molecule_name: None,
            })
            .collect();

        let handler = CliProgressHandler::hidden();
        let reporter = ProgressReporter::with_callback(handler.get_callback());
        let results = score_rows(&pipeline, &rows, &reporter);

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
        assert_eq!(results[0].prediction_class, PredictionClass::Permeable);
        assert!(results.iter().all(|r| r.fingerprint_features.is_none()));
        assert_eq!(handler.failed_count(), 2);
    }

    #[test]
    fn scored_rows_round_trip_through_the_output_file() {
        let dir = tempdir().unwrap();
        let pipeline = pipeline_with_constant_model(dir.path(), 0.2);
        let rows = vec![InputRow {
            smiles: "CCO".to_string(),
            molecule_name: Some("ethanol".to_string()),
        }];
        let results = score_rows(&pipeline, &rows, &ProgressReporter::new());

        let out_path = dir.path().join("out.csv");
        output::write_csv(File::create(&out_path).unwrap(), &results).unwrap();

        let mut reader = csv::Reader::from_path(&out_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let record = reader.records().next().unwrap().unwrap();
        let field = |name: &str| {
            let idx = headers.iter().position(|h| h == name).unwrap();
            record.get(idx).unwrap().to_string()
        };
        assert_eq!(field("molecule_name"), "ethanol");
        assert_eq!(field("status"), "success");
        assert_eq!(field("prediction_class"), "non_permeable");
        assert_eq!(field("model_version"), "constant");
        assert_eq!(field("mol_formula"), "C2H6O");
    }
}
