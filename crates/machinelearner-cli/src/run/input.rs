use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use machinelearner::ModelConfig;

/// Settings for one fit / predict / score run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub train_data: String,
    pub test_data: Option<String>,
    pub target_column: String,
    pub output_file: Option<String>,
    /// Held-out fraction used when no test file is given.
    pub test_size: f64,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            model: ModelConfig::default(),
            train_data: String::new(),
            test_data: None,
            target_column: String::from("target"),
            output_file: None,
            test_size: 0.25,
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn from_arguments(config_path: &PathBuf, matches: &ArgMatches) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let mut config: RunConfig = serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        // Apply CLI overrides
        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        validate_tsv_or_csv_file(&config.train_data)?;

        if let Some(test_data) = matches.get_one::<String>("test_data") {
            config.test_data = Some(test_data.clone());
        }
        if let Some(test_data) = &config.test_data {
            validate_tsv_or_csv_file(test_data)?;
        }

        if let Some(model_type) = matches.get_one::<String>("model_type") {
            // A different model type invalidates the configured parameters.
            if *model_type != config.model.model_type {
                config.model = model_type.parse()?;
            }
        }

        if let Some(target) = matches.get_one::<String>("target_column") {
            config.target_column = target.clone();
        }

        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = Some(output_file.clone());
        }

        if let Some(test_size) = matches.get_one::<f64>("test_size") {
            config.test_size = *test_size;
        }

        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = *seed;
        }

        Ok(config)
    }
}

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb.extension().and_then(|s| s.to_str()).map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}
