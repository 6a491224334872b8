use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::PipelineOverrides;
use crate::error::{CliError, Result};
use permeant::engine::config::PipelineConfigBuilder;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Resolves every setting with the precedence CLI flag > `--set` > file > defaults.
pub fn build_config(
    config_path: Option<&Path>,
    args: &PipelineOverrides,
    max_batch_size: Option<usize>,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let fp_file = file_config.fingerprint.take().unwrap_or_default();
    let model_file = file_config.model.take().unwrap_or_default();
    let applicability_file = file_config.applicability.take().unwrap_or_default();
    let alerts_file = file_config.alerts.take().unwrap_or_default();
    let batch_file = file_config.batch.take().unwrap_or_default();

    let radius = args.radius.or(fp_file.radius).unwrap_or(defaults.radius);
    let n_bits = args.bits.or(fp_file.n_bits).unwrap_or(defaults.n_bits);
    let model_path = args
        .model_path
        .clone()
        .or(model_file.path)
        .unwrap_or_else(|| PathBuf::from(&defaults.model_path));
    let allow_synthetic_fallback = if args.no_fallback {
        false
    } else {
        model_file
            .allow_synthetic_fallback
            .unwrap_or(defaults.allow_synthetic_fallback)
    };
    let reference_path = args
        .reference_path
        .clone()
        .or(applicability_file.reference_path)
        .unwrap_or_else(|| PathBuf::from(&defaults.reference_path));
    let pains_path = args.pains_path.clone().or(alerts_file.pains_path);
    let brenk_path = args.brenk_path.clone().or(alerts_file.brenk_path);

    let max_batch_size = max_batch_size
        .or(batch_file.max_batch_size)
        .unwrap_or(defaults.max_batch_size);
    if max_batch_size == 0 {
        return Err(CliError::Config(
            "`max-batch-size` must be greater than zero".to_string(),
        ));
    }

    let pipeline = PipelineConfigBuilder::new()
        .fingerprint_radius(radius)
        .fingerprint_bits(n_bits)
        .model_path(model_path)
        .allow_synthetic_fallback(allow_synthetic_fallback)
        .reference_path(reference_path)
        .pains_catalog_path(pains_path)
        .brenk_catalog_path(brenk_path)
        .build()?;

    Ok(AppConfig {
        pipeline,
        max_batch_size,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "fingerprint.radius" => {
                config
                    .fingerprint
                    .get_or_insert_with(Default::default)
                    .radius = Some(parse_value(key, value, "integer")?);
            }
            "fingerprint.n-bits" => {
                config
                    .fingerprint
                    .get_or_insert_with(Default::default)
                    .n_bits = Some(parse_value(key, value, "integer")?);
            }
            "model.path" => {
                config.model.get_or_insert_with(Default::default).path = Some(value.into());
            }
            "model.allow-synthetic-fallback" => {
                config
                    .model
                    .get_or_insert_with(Default::default)
                    .allow_synthetic_fallback = Some(parse_value(key, value, "boolean")?);
            }
            "applicability.reference-path" => {
                config
                    .applicability
                    .get_or_insert_with(Default::default)
                    .reference_path = Some(value.into());
            }
            "alerts.pains-path" => {
                config.alerts.get_or_insert_with(Default::default).pains_path = Some(value.into());
            }
            "alerts.brenk-path" => {
                config.alerts.get_or_insert_with(Default::default).brenk_path = Some(value.into());
            }
            "batch.max-batch-size" => {
                config
                    .batch
                    .get_or_insert_with(Default::default)
                    .max_batch_size = Some(parse_value(key, value, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use permeant::engine::config::{DEFAULT_MODEL_PATH, DEFAULT_REFERENCE_PATH};
    use std::fs;
    use tempfile::tempdir;

    fn overrides() -> PipelineOverrides {
        PipelineOverrides::default()
    }

    #[test]
    fn no_file_and_no_flags_yields_defaults() {
        let config = build_config(None, &overrides(), None).unwrap();
        assert_eq!(config.pipeline.fingerprint.radius, 2);
        assert_eq!(config.pipeline.fingerprint.n_bits, 2048);
        assert_eq!(config.pipeline.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(
            config.pipeline.reference_path,
            PathBuf::from(DEFAULT_REFERENCE_PATH)
        );
        assert!(config.pipeline.allow_synthetic_fallback);
        assert_eq!(config.max_batch_size, 10_000);
    }

    #[test]
    fn cli_flags_beat_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("permeant.toml");
        fs::write(
            &path,
            "[fingerprint]\nradius = 3\nn-bits = 512\n[model]\npath = \"file.json\"\n[batch]\nmax-batch-size = 20\n",
        )
        .unwrap();

        let args = PipelineOverrides {
            bits: Some(1024),
            model_path: Some(PathBuf::from("flag.json")),
            no_fallback: true,
            ..overrides()
        };
        let config = build_config(Some(&path), &args, Some(5)).unwrap();

        assert_eq!(config.pipeline.fingerprint.radius, 3);
        assert_eq!(config.pipeline.fingerprint.n_bits, 1024);
        assert_eq!(config.pipeline.model_path, PathBuf::from("flag.json"));
        assert!(!config.pipeline.allow_synthetic_fallback);
        assert_eq!(config.max_batch_size, 5);
    }

    #[test]
    fn set_values_override_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("permeant.toml");
        fs::write(&path, "[alerts]\nbrenk-path = \"file.csv\"\n").unwrap();

        let args = PipelineOverrides {
            set_values: vec![
                "alerts.brenk-path=set.csv".to_string(),
                "model.allow-synthetic-fallback=false".to_string(),
                "batch.max-batch-size=7".to_string(),
            ],
            ..overrides()
        };
        let config = build_config(Some(&path), &args, None).unwrap();
        assert_eq!(
            config.pipeline.brenk_catalog_path,
            Some(PathBuf::from("set.csv"))
        );
        assert!(!config.pipeline.allow_synthetic_fallback);
        assert_eq!(config.max_batch_size, 7);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["fingerprint.radius", "fingerprint.radius=abc", "scoring.threshold=1"] {
            let args = PipelineOverrides {
                set_values: vec![bad.to_string()],
                ..overrides()
            };
            assert!(matches!(
                build_config(None, &args, None),
                Err(CliError::Config(_))
            ));
        }
    }

    #[test]
    fn zero_bits_and_zero_batch_size_are_config_errors() {
        let args = PipelineOverrides {
            bits: Some(0),
            ..overrides()
        };
        assert!(matches!(
            build_config(None, &args, None),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            build_config(None, &overrides(), Some(0)),
            Err(CliError::Config(_))
        ));
    }
}
