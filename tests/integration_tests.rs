/// Integration tests for the vehicle ETA backend
///
/// Run with: cargo test --test integration_tests -- --nocapture

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use std::{fs, io::Write, path::Path, time::Duration};
use tower::ServiceExt;
use vehicle_eta::{
    build_router, AppState, Config, Dataset, ModelRegistry, PredictionError, PredictionResult,
    Regressor, StartupError, StreamEvent,
};

/// Ignores its input and returns a fixed ETA.
struct FixedEta {
    width: usize,
    value: f64,
}

impl Regressor for FixedEta {
    fn n_features(&self) -> usize {
        self.width
    }

    fn predict(&self, x: &[f64]) -> Result<f64, PredictionError> {
        if x.len() != self.width {
            return Err(PredictionError::FeatureLength {
                expected: self.width,
                actual: x.len(),
            });
        }
        Ok(self.value)
    }
}

/// Always fails, like a broken model backend.
struct Broken;

impl Regressor for Broken {
    fn n_features(&self) -> usize {
        9
    }

    fn predict(&self, _x: &[f64]) -> Result<f64, PredictionError> {
        Err(PredictionError::Backend("boom".to_string()))
    }
}

fn fixed_models() -> ModelRegistry {
    ModelRegistry::new(
        Box::new(FixedEta { width: 6, value: 10.0 }),
        Box::new(FixedEta { width: 8, value: 12.0 }),
        Box::new(FixedEta { width: 9, value: 14.0 }),
    )
    .expect("widths are valid")
}

fn write_csv(dir: &Path, rows: usize) -> std::path::PathBuf {
    let path = dir.join("positions.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "latitude,longitude,altitude,date,time").unwrap();
    for i in 0..rows {
        writeln!(
            f,
            "{:.6},{:.6},492,2008-10-23,02:{:02}:{:02}",
            39.984702 + i as f64 * 0.0001,
            116.318417 + i as f64 * 0.0001,
            53 + i / 60,
            i % 60
        )
        .unwrap();
    }
    path
}

fn app(dataset: Dataset, models: ModelRegistry, config: Config) -> Router {
    build_router(AppState::new(dataset, models, config))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_snapshot_returns_sample_of_dataset() {
    println!("\n=== Test: Snapshot Endpoint ===");
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 40)).unwrap();
    let reference = dataset.clone();

    let (status, content_type, body) =
        get(app(dataset, fixed_models(), Config::default()), "/api/vehicle").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let points: Vec<PredictionResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(points.len(), 10, "default sample size");
    for p in &points {
        assert!(reference.contains_position(p.latitude, p.longitude));
        assert_eq!(p.eta, 12.0, "mean of 10, 12, 14");
        assert!((30.0..=80.0).contains(&p.speed));
        assert!((p.speed * 100.0 - (p.speed * 100.0).round()).abs() < 1e-6, "speed rounded to 2 dp");
        assert!(p.timestamp.starts_with("2008-10-23 02:"));
    }
    println!("✓ {} points, all from dataset", points.len());
}

#[tokio::test]
async fn test_snapshot_timestamp_joins_date_and_time() {
    let dataset = Dataset::from_rows(vec![vehicle_eta::DatasetRow {
        latitude: 39.977183,
        longitude: 116.329867,
        date: "2008-10-24".to_string(),
        time: "04:12:30".to_string(),
    }]);
    let config = Config {
        sample_size: 1,
        ..Config::default()
    };

    let (_, _, body) = get(app(dataset, fixed_models(), config), "/api/vehicle").await;
    let points: Vec<PredictionResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].timestamp, "2008-10-24 04:12:30");
}

#[tokio::test]
async fn test_snapshot_respects_configured_sample_size() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 40)).unwrap();
    let config = Config {
        sample_size: 20,
        ..Config::default()
    };

    let (_, _, body) = get(app(dataset, fixed_models(), config), "/api/vehicle").await;
    let points: Vec<PredictionResult> = serde_json::from_str(&body).unwrap();
    assert_eq!(points.len(), 20);
}

#[tokio::test]
async fn test_model_failure_is_server_error() {
    println!("\n=== Test: Prediction Failure ===");
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 12)).unwrap();
    let models = ModelRegistry::new(
        Box::new(FixedEta { width: 6, value: 10.0 }),
        Box::new(FixedEta { width: 8, value: 12.0 }),
        Box::new(Broken),
    )
    .unwrap();

    let (status, _, body) = get(app(dataset, models, Config::default()), "/api/vehicle").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], 500);
    assert!(json["error"].is_string());
    println!("✓ Broken model surfaced as 500");
}

#[tokio::test]
async fn test_stream_emits_one_event_per_row() {
    println!("\n=== Test: Streaming Endpoint ===");
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 3)).unwrap();
    let reference = dataset.clone();
    let config = Config {
        stream_interval: Duration::from_millis(20),
        ..Config::default()
    };

    let (status, content_type, body) =
        get(app(dataset, fixed_models(), config), "/api/vehicle-stream").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/event-stream"));

    let events: Vec<StreamEvent> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect();

    assert_eq!(events.len(), 3, "stream closes after the last row");
    for (ev, row) in events.iter().zip(reference.rows()) {
        assert_eq!(ev.latitude, row.latitude);
        assert_eq!(ev.longitude, row.longitude);
        assert!((30.0..80.0).contains(&ev.speed));
        assert!((5.0..20.0).contains(&ev.eta));
    }
    println!("✓ {} events in dataset order", events.len());
}

#[tokio::test(start_paused = true)]
async fn test_stream_frames_are_one_interval_apart() {
    println!("\n=== Test: Stream Pacing ===");
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 3)).unwrap();
    let config = Config {
        stream_interval: Duration::from_secs(1),
        ..Config::default()
    };

    let response = app(dataset, fixed_models(), config)
        .oneshot(
            Request::builder()
                .uri("/api/vehicle-stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let mut arrivals = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.unwrap();
        let frames = String::from_utf8_lossy(&chunk)
            .lines()
            .filter(|line| line.starts_with("data:"))
            .count();
        for _ in 0..frames {
            arrivals.push(tokio::time::Instant::now());
        }
    }

    assert_eq!(arrivals.len(), 3, "one frame per row, then the body ends");
    for pair in arrivals.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_secs(1), "frames only {:?} apart", gap);
    }
    println!("✓ 3 frames, each at least 1s apart");
}

#[tokio::test]
async fn test_health_reports_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(write_csv(dir.path(), 7)).unwrap();

    let (status, _, body) = get(app(dataset, fixed_models(), Config::default()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dataset_rows"], 7);
    assert_eq!(json["sample_size"], 10);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dataset = Dataset::from_rows(vec![vehicle_eta::DatasetRow {
        latitude: 39.9,
        longitude: 116.3,
        date: "2008-10-23".to_string(),
        time: "02:53:04".to_string(),
    }]);
    let response = app(dataset, fixed_models(), Config::default())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:8000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[test]
fn test_dataset_without_time_column_fails_at_startup() {
    println!("\n=== Test: Startup Validation ===");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_time.csv");
    fs::write(&path, "latitude,longitude,date\n39.9,116.3,2008-10-23\n").unwrap();

    let err = Dataset::load(&path).unwrap_err();
    assert!(matches!(err, StartupError::MissingColumn { column: "time", .. }));
    let msg = err.to_string();
    assert!(msg.contains("time"), "message should name the column: {msg}");
    println!("✓ {}", msg);
}

#[test]
fn test_registry_loads_json_artifacts() {
    println!("\n=== Test: Model Artifacts ===");
    let dir = tempfile::tempdir().unwrap();
    let lr = dir.path().join("lr.json");
    let dt = dir.path().join("dt.json");
    let rf = dir.path().join("rf.json");

    fs::write(
        &lr,
        r#"{"kind": "linear", "n_features": 6,
            "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0], "intercept": 10.0}"#,
    )
    .unwrap();
    fs::write(
        &dt,
        r#"{"kind": "decision_tree", "n_features": 8,
            "children_left": [-1], "children_right": [-1], "feature": [-2],
            "threshold": [-2.0], "value": [12.0]}"#,
    )
    .unwrap();
    fs::write(
        &rf,
        r#"{"kind": "random_forest", "n_features": 9, "trees": [
            {"children_left": [-1], "children_right": [-1], "feature": [-2],
             "threshold": [-2.0], "value": [13.0]},
            {"children_left": [-1], "children_right": [-1], "feature": [-2],
             "threshold": [-2.0], "value": [15.0]}
        ]}"#,
    )
    .unwrap();

    let config = Config {
        lr_model_path: lr,
        dt_model_path: dt,
        rf_model_path: rf,
        ..Config::default()
    };
    let models = ModelRegistry::load(&config).unwrap();

    let draw = vehicle_eta::features::FeatureDraw::random(&mut rand::thread_rng());
    let row = vehicle_eta::DatasetRow {
        latitude: 39.9,
        longitude: 116.3,
        date: "2008-10-23".to_string(),
        time: "02:53:04".to_string(),
    };
    assert_eq!(models.predict_eta(&draw, &row).unwrap(), 12.0);
    println!("✓ linear + tree + forest averaged to 12.0");
}

#[test]
fn test_registry_rejects_swapped_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let narrow = dir.path().join("narrow.json");
    fs::write(
        &narrow,
        r#"{"kind": "linear", "n_features": 6,
            "coefficients": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0], "intercept": 0.0}"#,
    )
    .unwrap();

    let config = Config {
        lr_model_path: narrow.clone(),
        dt_model_path: narrow.clone(),
        rf_model_path: narrow,
        ..Config::default()
    };
    let err = ModelRegistry::load(&config).err().unwrap();
    assert!(matches!(err, StartupError::FeatureWidth { expected: 8, .. }));
}
