//! Builds the `/api/vehicle` response.

use crate::{
    dataset::Dataset,
    error::PredictionError,
    eta::round2,
    features::FeatureDraw,
    model::ModelRegistry,
    sampler::sample_rows,
    types::PredictionResult,
};
use rand::Rng;

/// Sample `sample_size` rows and predict an ETA for each, in sample order.
/// Any model failure fails the whole batch.
pub fn build_snapshot<R: Rng + ?Sized>(
    dataset: &Dataset,
    models: &ModelRegistry,
    sample_size: usize,
    rng: &mut R,
) -> Result<Vec<PredictionResult>, PredictionError> {
    let rows = sample_rows(dataset, sample_size, rng);
    let mut points = Vec::with_capacity(rows.len());

    for row in rows {
        let draw = FeatureDraw::random(rng);
        tracing::debug!(?draw, lat = row.latitude, lon = row.longitude, "row draw");

        let eta = models.predict_eta(&draw, row)?;
        points.push(PredictionResult {
            latitude: row.latitude,
            longitude: row.longitude,
            speed: round2(draw.speed_kmh),
            eta,
            timestamp: row.timestamp(),
        });
    }

    Ok(points)
}
