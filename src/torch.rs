//! TorchScript-backed regressors, enabled with the `torch` feature.

use crate::{
    error::{PredictionError, StartupError},
    model::{check_len, Regressor},
};
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

pub struct TorchRegressor {
    model: CModule,
    device: Device,
    n_features: usize,
}

impl TorchRegressor {
    pub fn load(path: &Path, n_features: usize) -> Result<Self, StartupError> {
        let device = Device::Cpu;
        let malformed = |reason: String| StartupError::ModelFormat {
            path: path.to_path_buf(),
            reason,
        };

        let model = CModule::load_on_device(path, device)
            .map_err(|e| malformed(format!("failed to load TorchScript: {}", e)))?;

        // Probe output shape with a dummy forward; expect a single scalar
        let dummy = Tensor::zeros([1, n_features as i64], (Kind::Float, device));
        let t = model
            .forward_ts(&[dummy])
            .map_err(|e| malformed(format!("probe forward failed: {}", e)))?;
        if t.numel() != 1 {
            return Err(malformed(format!("unexpected model output size: {:?}", t.size())));
        }

        tracing::info!("loaded TorchScript {} ({} features)", path.display(), n_features);
        Ok(Self {
            model,
            device,
            n_features,
        })
    }
}

impl Regressor for TorchRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        check_len(x, self.n_features)?;

        let xs: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_slice(&xs)
            .reshape([1, self.n_features as i64])
            .to_device(self.device);

        let t = self
            .model
            .forward_ts(&[input])
            .map_err(|e| PredictionError::Backend(e.to_string()))?;
        if t.numel() != 1 {
            return Err(PredictionError::Backend(format!(
                "unexpected model output size: {:?}",
                t.size()
            )));
        }

        Ok(t.reshape([-1]).double_value(&[0]))
    }
}
