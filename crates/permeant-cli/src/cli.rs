use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Permeant Developers",
    version,
    about = "Permeant CLI - Blood-brain-barrier permeability scoring for small molecules from SMILES.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used for batch scoring.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one or more SMILES strings and print the results as JSON.
    Score(ScoreArgs),
    /// Score every row of a CSV file and write the results to another CSV file.
    Batch(BatchArgs),
    /// Inspect or export the classifier model.
    Model(ModelArgs),
}

/// Settings shared by every command that builds a scoring pipeline.
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineOverrides {
    /// Override the Morgan fingerprint radius.
    #[arg(long, value_name = "INT")]
    pub radius: Option<u32>,

    /// Override the fingerprint length in bits.
    #[arg(long, value_name = "INT")]
    pub bits: Option<usize>,

    /// Override the serialized classifier model file.
    #[arg(short = 'm', long = "model", value_name = "PATH")]
    pub model_path: Option<PathBuf>,

    /// Leave the classifier unloaded instead of using the synthetic fallback model.
    #[arg(long)]
    pub no_fallback: bool,

    /// Override the reference dataset used for applicability scoring.
    #[arg(short = 'r', long = "reference", value_name = "PATH")]
    pub reference_path: Option<PathBuf>,

    /// Load the PAINS catalog from a CSV file (columns: name,smarts).
    #[arg(long = "pains-catalog", value_name = "PATH")]
    pub pains_path: Option<PathBuf>,

    /// Load the Brenk catalog from a CSV file (columns: name,smarts).
    #[arg(long = "brenk-catalog", value_name = "PATH")]
    pub brenk_path: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S fingerprint.n-bits=1024
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `score` subcommand.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// One or more SMILES strings.
    #[arg(required = true, value_name = "SMILES")]
    pub smiles: Vec<String>,

    /// Label copied into each result.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Include the dense fingerprint vector in the output.
    #[arg(long)]
    pub features: bool,

    #[command(flatten)]
    pub pipeline: PipelineOverrides,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input CSV file with a `smiles` column and an optional `molecule_name` column.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Output CSV file, one row per input row.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the maximum number of rows accepted in one batch.
    #[arg(long, value_name = "INT")]
    pub max_batch_size: Option<usize>,

    /// Do not draw the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub pipeline: PipelineOverrides,
}

/// Arguments for the `model` subcommand.
#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(subcommand)]
    pub command: ModelCommands,

    #[command(flatten)]
    pub pipeline: PipelineOverrides,
}

/// Available commands for model inspection.
#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// Show the provenance, size and most important features of the configured model.
    Info {
        /// Number of feature importances to list.
        #[arg(long, default_value_t = 10, value_name = "INT")]
        top: usize,
    },
    /// Write the synthetic fallback forest as a JSON model file.
    ExportFallback {
        /// Destination of the model file.
        #[arg(short, long, required = true, value_name = "PATH")]
        output: PathBuf,
    },
}
