//! Estate Server binary.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use estate_cache::{CacheFacade, CacheMetrics, register_cache_metrics};
use estate_core::PropertyRecord;
use estate_server::metrics::{init_metrics, register_http_metrics};
use estate_server::{AppState, InMemoryRepository, Settings, run_server_with_state};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let addr = settings
        .server
        .socket_addr()
        .context("invalid server host/port")?;

    tracing::info!("Starting Estate Server v{}", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;
    register_http_metrics();
    register_cache_metrics();

    // El backend de cache conecta de forma lazy en el primer uso
    let cache = CacheFacade::from_settings(&settings.cache, CacheMetrics::new())
        .context("invalid cache configuration")?;

    let repository = match &settings.data.seed_file {
        Some(path) => {
            let records = load_seed(path).await?;
            tracing::info!(count = records.len(), path = %path.display(), "Seed data loaded");
            InMemoryRepository::with_records(records)
        },
        None => InMemoryRepository::new(),
    };

    let state = AppState::new(Arc::new(repository), cache);

    run_server_with_state(addr, state, prometheus_handle).await?;

    Ok(())
}

async fn load_seed(path: &Path) -> anyhow::Result<Vec<PropertyRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("invalid seed file {}", path.display()))
}
