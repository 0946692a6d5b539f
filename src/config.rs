//! Runtime configuration, read once from the environment.

use crate::error::StartupError;
use std::{env, path::PathBuf, time::Duration};

/// Snapshot sample size used when `SAMPLE_SIZE` is not set.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Pacing between streamed events when `STREAM_INTERVAL_MS` is not set.
pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: String,

    /// CSV with latitude, longitude, date, time
    pub dataset_path: PathBuf,

    /// 6-feature model
    pub lr_model_path: PathBuf,

    /// 8-feature model
    pub dt_model_path: PathBuf,

    /// 9-feature model
    pub rf_model_path: PathBuf,

    /// Rows per snapshot response
    pub sample_size: usize,

    /// Delay between streamed events
    pub stream_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            dataset_path: PathBuf::from("1_Raw_Dataset.csv"),
            lr_model_path: PathBuf::from("trained_models/linear_regression_model.json"),
            dt_model_path: PathBuf::from("trained_models/decision_tree_model.json"),
            rf_model_path: PathBuf::from("trained_models/random_forest_model.json"),
            sample_size: DEFAULT_SAMPLE_SIZE,
            stream_interval: DEFAULT_STREAM_INTERVAL,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),

            dataset_path: path_var("DATASET_PATH", defaults.dataset_path),
            lr_model_path: path_var("LR_MODEL_PATH", defaults.lr_model_path),
            dt_model_path: path_var("DT_MODEL_PATH", defaults.dt_model_path),
            rf_model_path: path_var("RF_MODEL_PATH", defaults.rf_model_path),

            sample_size: env::var("SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sample_size),

            stream_interval: env::var("STREAM_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.stream_interval),
        }
    }

    pub fn validate(&self) -> Result<(), StartupError> {
        if self.sample_size == 0 {
            return Err(StartupError::InvalidConfig(
                "SAMPLE_SIZE must be at least 1".to_string(),
            ));
        }
        if self.stream_interval.is_zero() {
            return Err(StartupError::InvalidConfig(
                "STREAM_INTERVAL_MS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn path_var(key: &str, default: PathBuf) -> PathBuf {
    resolve_artifact_path(env::var(key).map(PathBuf::from).unwrap_or(default))
}

/// Relative paths missing from the working directory are retried next to
/// the executable. Returns the input unchanged if neither location exists;
/// the loader then reports the missing file.
pub fn resolve_artifact_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path;
    }

    if let Ok(mut beside_exe) = env::current_exe() {
        beside_exe.pop(); // exe dir
        beside_exe.push(&path);
        if beside_exe.exists() {
            return beside_exe;
        }
    }

    path
}
