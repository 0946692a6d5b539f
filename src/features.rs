//! Synthetic driving conditions fed to the ETA models.

use crate::{
    dataset::DatasetRow,
    model::{DT_FEATURES, LR_FEATURES, RF_FEATURES},
};
use rand::{seq::SliceRandom, Rng};
use std::ops::Range;

pub const SPEED_KMH: Range<f64> = 30.0..80.0;
pub const DISTANCE_TRAVELLED_KM: Range<f64> = 1.0..15.0;
pub const REMAINING_KM: Range<f64> = 1.0..30.0;
pub const TRAFFIC_FACTOR: Range<f64> = 0.8..1.3;
pub const DRIVER_AGGRESSIVENESS: Range<f64> = 0.9..1.1;
pub const ALTITUDE_M: Range<f64> = 200.0..500.0;

/// Road factor is a discrete pick, not a range.
pub const ROAD_FACTORS: [f64; 3] = [0.95, 1.0, 1.05];

/// One independent draw of every synthetic feature for a single row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDraw {
    pub speed_kmh: f64,
    pub distance_travelled: f64,
    pub remaining_km: f64,
    pub traffic_factor: f64,
    pub driver_aggressiveness: f64,
    pub road_factor: f64,
    /// Only the 9-wide vector uses this
    pub altitude: f64,
}

impl FeatureDraw {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            speed_kmh: rng.gen_range(SPEED_KMH),
            distance_travelled: rng.gen_range(DISTANCE_TRAVELLED_KM),
            remaining_km: rng.gen_range(REMAINING_KM),
            traffic_factor: rng.gen_range(TRAFFIC_FACTOR),
            driver_aggressiveness: rng.gen_range(DRIVER_AGGRESSIVENESS),
            road_factor: *ROAD_FACTORS.choose(rng).unwrap_or(&1.0),
            altitude: rng.gen_range(ALTITUDE_M),
        }
    }

    /// Input for the linear model.
    pub fn base_vector(&self) -> [f64; LR_FEATURES] {
        [
            self.speed_kmh,
            self.distance_travelled,
            self.remaining_km,
            self.traffic_factor,
            self.driver_aggressiveness,
            self.road_factor,
        ]
    }

    /// Input for the decision tree: base features, then latitude, longitude.
    pub fn positional_vector(&self, row: &DatasetRow) -> [f64; DT_FEATURES] {
        let mut v = [0.0; DT_FEATURES];
        v[..LR_FEATURES].copy_from_slice(&self.base_vector());
        v[LR_FEATURES] = row.latitude;
        v[LR_FEATURES + 1] = row.longitude;
        v
    }

    /// Input for the random forest: positional features, then altitude.
    pub fn full_vector(&self, row: &DatasetRow) -> [f64; RF_FEATURES] {
        let mut v = [0.0; RF_FEATURES];
        v[..DT_FEATURES].copy_from_slice(&self.positional_vector(row));
        v[DT_FEATURES] = self.altitude;
        v
    }
}
