//! Error types for startup, inference and the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that prevents the process from serving. Always fatal.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset {path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("dataset {path} line {line}: {reason}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("dataset {path} has no rows")]
    EmptyDataset { path: PathBuf },
    #[error("malformed model artifact {path}: {reason}")]
    ModelFormat { path: PathBuf, reason: String },
    #[error("model `{name}` expects {actual} features, need {expected}")]
    FeatureWidth {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported model artifact {path} (TorchScript needs the `torch` feature)")]
    UnsupportedModel { path: PathBuf },
    #[error("warmup prediction failed for model `{name}`: {source}")]
    Warmup {
        name: &'static str,
        #[source]
        source: PredictionError,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A single model invocation failed or produced unusable output.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("feature length mismatch: got {actual}, expected {expected}")]
    FeatureLength { expected: usize, actual: usize },
    #[error("model `{model}` returned a non-finite value")]
    NonFinite { model: &'static str },
    #[error("model backend error: {0}")]
    Backend(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Request-level failure surfaced to HTTP clients.
#[derive(Debug)]
pub enum AppError {
    Prediction(PredictionError),
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        AppError::Prediction(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Prediction(err) => {
                tracing::error!("Prediction error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "ETA prediction failed")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
