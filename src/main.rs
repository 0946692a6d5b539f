use anyhow::Context;
use tracing_subscriber::EnvFilter;
use vehicle_eta::{build_router, AppState, Config, Dataset, ModelRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vehicle_eta=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    config.validate()?;

    let dataset = Dataset::load(&config.dataset_path)
        .with_context(|| format!("failed to load dataset {}", config.dataset_path.display()))?;
    if dataset.len() < config.sample_size {
        tracing::warn!(
            "dataset has {} rows, fewer than SAMPLE_SIZE={}; snapshots will return every row",
            dataset.len(),
            config.sample_size
        );
    }

    let models = ModelRegistry::load(&config).context("failed to load ETA models")?;

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(dataset, models, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind TCP listener at {}", bind_addr))?;
    tracing::info!("🚀 vehicle tracking backend listening on http://{}", bind_addr);
    tracing::info!("snapshot: http://{}/api/vehicle", bind_addr);
    tracing::info!("stream:   http://{}/api/vehicle-stream", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
