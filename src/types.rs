use serde::{Deserialize, Serialize};

/// One element of the `/api/vehicle` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub eta: f64,
    pub timestamp: String, // "{date} {time}"
}

/// One `data:` frame of `/api/vehicle-stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub eta: f64,
}
