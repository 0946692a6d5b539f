//! Multi-model ETA aggregation.

use crate::{
    dataset::DatasetRow,
    error::PredictionError,
    features::FeatureDraw,
    model::{ModelRegistry, Regressor, DT_NAME, LR_NAME, RF_NAME},
};

/// Round to two decimal places from the exact binary value, ties to even.
///
/// Scaling by 100 first would round twice: 2.675 is stored just below
/// 2.675 but `2.675 * 100.0` lands exactly on 267.5.
pub fn round2(x: f64) -> f64 {
    let doubled = x * 200.0;
    // x is an exact tie only when x * 200 is an odd integer with no
    // rounding error in the product.
    let exact_tie = x.mul_add(200.0, -doubled) == 0.0
        && doubled.fract() == 0.0
        && doubled % 2.0 != 0.0;
    if exact_tie {
        return (x * 100.0).round_ties_even() / 100.0;
    }

    // `{:.2}` rounds the exact decimal expansion, so non-ties are correct.
    format!("{:.2}", x).parse().unwrap_or(x)
}

impl ModelRegistry {
    /// Mean of the three model outputs for this row's draw, rounded to two
    /// decimals. The first failing model aborts the computation.
    pub fn predict_eta(&self, draw: &FeatureDraw, row: &DatasetRow) -> Result<f64, PredictionError> {
        let eta_lr = invoke(LR_NAME, self.linear(), &draw.base_vector())?;
        let eta_dt = invoke(DT_NAME, self.tree(), &draw.positional_vector(row))?;
        let eta_rf = invoke(RF_NAME, self.forest(), &draw.full_vector(row))?;

        Ok(round2((eta_lr + eta_dt + eta_rf) / 3.0))
    }
}

fn invoke(name: &'static str, model: &dyn Regressor, x: &[f64]) -> Result<f64, PredictionError> {
    let y = model.predict(x)?;
    if !y.is_finite() {
        return Err(PredictionError::NonFinite { model: name });
    }
    Ok(y)
}
