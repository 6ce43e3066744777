//! Sweep configuration.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment -> CLI overrides.

use crate::error::SweepError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings shared by every run of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Experiment label, part of every artifact name.
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
    /// Seed for the per-run random generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Checkpoint iterations; the maximum is the iteration budget.
    #[serde(default = "default_iteration_list")]
    pub iteration_list: Vec<usize>,
    /// Attempt budget handed to the algorithm.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_true")]
    pub generate_curves: bool,
    /// Where tables are written. Nothing is written when unset.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    /// Overrides the algorithm's short name in artifact names.
    #[serde(default)]
    pub runner_name: Option<String>,
    /// Fixed arguments passed to every run; swept values take precedence.
    #[serde(default)]
    pub extra_args: BTreeMap<String, serde_json::Value>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            experiment_name: default_experiment_name(),
            seed: default_seed(),
            iteration_list: default_iteration_list(),
            max_attempts: default_max_attempts(),
            generate_curves: true,
            output_directory: None,
            runner_name: None,
            extra_args: BTreeMap::new(),
        }
    }
}

fn default_experiment_name() -> String {
    "experiment".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_iteration_list() -> Vec<usize> {
    (0..=10).map(|p| 1usize << p).collect()
}

fn default_max_attempts() -> usize {
    500
}

fn default_true() -> bool {
    true
}

impl SweepConfig {
    /// Reject configurations that cannot produce a valid sweep.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.iteration_list.is_empty() {
            return Err(SweepError::config("iteration_list must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(SweepError::config("max_attempts must be at least 1"));
        }
        if self.experiment_name.trim().is_empty() {
            return Err(SweepError::config("experiment_name must not be empty"));
        }
        for name in std::iter::once(&self.experiment_name).chain(self.runner_name.as_ref()) {
            if name.contains(['/', '\\']) {
                return Err(SweepError::config(format!(
                    "'{name}' is used in file names and must not contain path separators"
                )));
            }
        }
        if let Some(dir) = &self.output_directory
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(SweepError::config(format!(
                "output_directory {} is not a directory",
                dir.display()
            )));
        }
        Ok(())
    }

    pub fn max_iterations(&self) -> usize {
        self.iteration_list.iter().copied().max().unwrap_or(0)
    }
}

/// Command-line level overrides; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_list: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_curves: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_name: Option<String>,
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides
/// 2. Environment variables (prefixed with `SWEEPRUN_`)
/// 3. Explicit config file
/// 4. User config (`<config dir>/sweeprun/sweeprun.toml`)
/// 5. Built-in defaults
///
/// The result is validated before it is returned.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<SweepConfig, SweepError> {
    let mut figment = Figment::from(Serialized::defaults(SweepConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "sweeprun", "sweeprun") {
        let user_config = dirs.config_dir().join("sweeprun.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(SweepError::config(format!(
                "config file {} not found",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file(path));
    }

    // SWEEPRUN_SEED, SWEEPRUN_EXTRA_ARGS__RESTARTS, ...
    figment = figment.merge(Env::prefixed("SWEEPRUN_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: SweepConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = SweepConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_iterations(), 1024);
        assert_eq!(config.max_attempts, 500);
    }

    #[test]
    fn test_empty_checkpoints_fail_fast() {
        let config = SweepConfig {
            iteration_list: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SweepError::Config(_))));
    }

    #[test]
    fn test_output_path_must_be_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        let config = SweepConfig {
            output_directory: Some(file),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_names_reject_separators() {
        let config = SweepConfig {
            runner_name: Some("a/b".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_and_overrides_layering() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.toml");
        std::fs::write(
            &path,
            r#"
experiment_name = "onemax"
seed = 7
iteration_list = [5, 10]

[extra_args]
restarts = 2
"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            seed: Some(11),
            ..Default::default()
        };
        let config = load_config(Some(&path), Some(&overrides)).unwrap();
        assert_eq!(config.experiment_name, "onemax");
        assert_eq!(config.seed, 11);
        assert_eq!(config.iteration_list, vec![5, 10]);
        assert_eq!(config.extra_args["restarts"], serde_json::json!(2));
        assert!(config.generate_curves);
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config(Some(Path::new("/nonexistent/sweep.toml")), None);
        assert!(matches!(result, Err(SweepError::Config(_))));
    }
}
