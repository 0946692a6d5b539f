//! Demo backend serving sampled vehicle positions with an ETA averaged
//! over three trained regressors.
//!
//! `GET /api/vehicle` returns a random batch of rows with predicted ETAs.
//! `GET /api/vehicle-stream` walks the whole dataset as server-sent events,
//! one row per interval.

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eta;
pub mod features;
pub mod model;
pub mod sampler;
pub mod server;
pub mod snapshot;
pub mod stream;
#[cfg(feature = "torch")]
pub mod torch;
pub mod types;

pub use config::Config;
pub use dataset::{Dataset, DatasetRow};
pub use error::{AppError, AppResult, PredictionError, StartupError};
pub use model::{ModelRegistry, Regressor};
pub use server::{build_router, AppState};
pub use types::{PredictionResult, StreamEvent};
