use crate::cli::{ModelArgs, ModelCommands};
use crate::config::build_config;
use crate::error::Result;
use permeant::core::classifier::{Classifier, ModelError, ModelProvenance, training};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub fn run(args: ModelArgs, config_path: Option<&Path>) -> Result<()> {
    let config = build_config(config_path, &args.pipeline, None)?;
    let n_features = config.pipeline.fingerprint.n_bits;

    match args.command {
        ModelCommands::Info { top } => {
            let classifier = Classifier::load(
                &config.pipeline.model_path,
                n_features,
                config.pipeline.allow_synthetic_fallback,
            );
            if !classifier.is_loaded() {
                return Err(ModelError::NotLoaded.into());
            }
            print!("{}", describe(&classifier, top));
        }
        ModelCommands::ExportFallback { output } => {
            info!("Fitting synthetic fallback forest with {} features", n_features);
            let forest = training::synthetic_fallback(n_features, training::FALLBACK_SEED);
            forest.save(&output)?;
            println!(
                "Synthetic fallback model ({} trees, {} features) written to: {}",
                forest.trees.len(),
                forest.n_features,
                output.display()
            );
        }
    }
    Ok(())
}

/// Human-readable report of a loaded classifier.
pub fn describe(classifier: &Classifier, top_n: usize) -> String {
    let mut report = String::new();
    let Some(forest) = classifier.forest() else {
        return "No model loaded.\n".to_string();
    };

    let provenance = match classifier.provenance() {
        Some(ModelProvenance::Trained { path, .. }) => format!("trained ({})", path.display()),
        Some(ModelProvenance::SyntheticFallback { seed }) => {
            format!("synthetic fallback (seed {seed}); predictions are not meaningful")
        }
        None => "unknown".to_string(),
    };

    let _ = writeln!(report, "Provenance: {provenance}");
    let _ = writeln!(report, "Version:    {}", forest.version);
    let _ = writeln!(report, "Trees:      {}", forest.trees.len());
    let _ = writeln!(report, "Features:   {}", forest.n_features);

    let importances = classifier.feature_importance(top_n);
    if importances.is_empty() {
        let _ = writeln!(report, "No feature carries importance.");
    } else {
        let _ = writeln!(report, "Top {} feature(s):", importances.len());
        for (rank, (feature, importance)) in importances.iter().enumerate() {
            let _ = writeln!(report, "  {:>3}. bit {:<6} {:.4}", rank + 1, feature, importance);
        }
    }
    report
}
