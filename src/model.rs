use crate::{
    artifact::ModelArtifact,
    config::Config,
    error::{PredictionError, StartupError},
};
use std::{fs, path::Path};

/// Width of the speed/distance/traffic base feature set.
pub const LR_FEATURES: usize = 6;
/// Base features plus latitude, longitude.
pub const DT_FEATURES: usize = 8;
/// Base features plus position and altitude.
pub const RF_FEATURES: usize = 9;

pub const LR_NAME: &str = "linear_regression";
pub const DT_NAME: &str = "decision_tree";
pub const RF_NAME: &str = "random_forest";

/// A trained model: fixed-width feature vector in, scalar ETA out.
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError>;
}

pub(crate) fn check_len(x: &[f64], expected: usize) -> Result<(), PredictionError> {
    if x.len() != expected {
        return Err(PredictionError::FeatureLength {
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

/// The three ETA models, loaded once and shared read-only by every request.
pub struct ModelRegistry {
    lr: Box<dyn Regressor>,
    dt: Box<dyn Regressor>,
    rf: Box<dyn Regressor>,
}

impl ModelRegistry {
    pub fn new(
        lr: Box<dyn Regressor>,
        dt: Box<dyn Regressor>,
        rf: Box<dyn Regressor>,
    ) -> Result<Self, StartupError> {
        for (name, model, expected) in [
            (LR_NAME, &lr, LR_FEATURES),
            (DT_NAME, &dt, DT_FEATURES),
            (RF_NAME, &rf, RF_FEATURES),
        ] {
            if model.n_features() != expected {
                return Err(StartupError::FeatureWidth {
                    name,
                    expected,
                    actual: model.n_features(),
                });
            }
        }
        Ok(Self { lr, dt, rf })
    }

    /// Load all three artifacts named in `config` and run a warmup
    /// prediction through each.
    pub fn load(config: &Config) -> Result<Self, StartupError> {
        let registry = Self::new(
            load_artifact(&config.lr_model_path, LR_FEATURES)?,
            load_artifact(&config.dt_model_path, DT_FEATURES)?,
            load_artifact(&config.rf_model_path, RF_FEATURES)?,
        )?;
        registry.warmup()?;
        tracing::info!("warmup forward ok");
        Ok(registry)
    }

    pub fn warmup(&self) -> Result<(), StartupError> {
        for (name, model) in self.iter() {
            let zeros = vec![0.0; model.n_features()];
            model
                .predict(&zeros)
                .map_err(|source| StartupError::Warmup { name, source })?;
        }
        Ok(())
    }

    pub fn linear(&self) -> &dyn Regressor {
        self.lr.as_ref()
    }

    pub fn tree(&self) -> &dyn Regressor {
        self.dt.as_ref()
    }

    pub fn forest(&self) -> &dyn Regressor {
        self.rf.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn Regressor)> {
        [
            (LR_NAME, self.linear()),
            (DT_NAME, self.tree()),
            (RF_NAME, self.forest()),
        ]
        .into_iter()
    }
}

/// Load one model artifact. `.pt` files are TorchScript modules, anything
/// else is parsed as a JSON artifact.
pub fn load_artifact(path: &Path, width: usize) -> Result<Box<dyn Regressor>, StartupError> {
    let is_torchscript = path.extension().and_then(|e| e.to_str()) == Some("pt");
    if is_torchscript {
        return load_torchscript(path, width);
    }

    let text = fs::read_to_string(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_str(&text).map_err(|e| StartupError::ModelFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let model = artifact.into_regressor(path)?;
    tracing::info!(
        "loaded model {} ({} features)",
        path.display(),
        model.n_features()
    );
    Ok(model)
}

#[cfg(feature = "torch")]
fn load_torchscript(path: &Path, width: usize) -> Result<Box<dyn Regressor>, StartupError> {
    Ok(Box::new(crate::torch::TorchRegressor::load(path, width)?))
}

#[cfg(not(feature = "torch"))]
fn load_torchscript(path: &Path, _width: usize) -> Result<Box<dyn Regressor>, StartupError> {
    Err(StartupError::UnsupportedModel {
        path: path.to_path_buf(),
    })
}
