//! Configuration management for the AML risk pipeline

use crate::models::gbdt::GbdtParams;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem locations for pipeline outputs
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Where the fitted classifier artifact is persisted
    pub artifact: PathBuf,
    /// Where the account risk report is written
    pub report: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("aml_model.json"),
            report: PathBuf::from("processed_accounts.csv"),
        }
    }
}

/// Classifier hyperparameters
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_subsample")]
    pub subsample: f64,
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    3
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_subsample() -> f64 {
    1.0
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            learning_rate: default_learning_rate(),
            min_samples_leaf: default_min_samples_leaf(),
            subsample: default_subsample(),
        }
    }
}

impl ModelConfig {
    /// Combine the configured hyperparameters with the training seed.
    pub fn to_params(&self, seed: u64) -> GbdtParams {
        GbdtParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            learning_rate: self.learning_rate,
            min_samples_leaf: self.min_samples_leaf,
            subsample: self.subsample,
            seed,
        }
    }
}

/// Train/holdout split configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of labeled rows held out for evaluation
    #[serde(default = "default_holdout_fraction")]
    pub holdout_fraction: f64,
    /// Seed for the stratified shuffle and model subsampling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_holdout_fraction() -> f64 {
    0.3
}

fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: default_holdout_fraction(),
            seed: default_seed(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific TOML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load from an explicit path if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Ok(Self::default()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            model: ModelConfig::default(),
            training: TrainingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_mirrors_training_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.training.holdout_fraction, 0.3);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.model.n_trees, 100);
        assert_eq!(config.paths.report, PathBuf::from("processed_accounts.csv"));
    }

    #[test]
    fn to_params_carries_the_seed() {
        let config = ModelConfig::default();
        let params = config.to_params(7);
        assert_eq!(params.seed, 7);
        assert_eq!(params.n_trees, config.n_trees);
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let path =
            std::env::temp_dir().join(format!("aml_config_{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[model]\nn_trees = 25\n\n[training]\nseed = 7").unwrap();
        drop(file);

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.model.n_trees, 25);
        assert_eq!(config.training.seed, 7);
        // Untouched sections keep defaults
        assert_eq!(config.model.learning_rate, 0.1);
        assert_eq!(config.paths.artifact, PathBuf::from("aml_model.json"));
    }
}
