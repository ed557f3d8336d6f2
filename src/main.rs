use std::sync::Arc;

use bayangida_orders::api;
use bayangida_orders::config::{Config, LogFormat};
use bayangida_orders::error::AppError;
use bayangida_orders::state::AppState;
use bayangida_orders::store::memory::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let store = match &config.seed_path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
                AppError::Internal(format!("failed to read seed {}: {err}", path.display()))
            })?;
            let store = MemoryStore::from_json(&raw)?;
            tracing::info!(
                path = %path.display(),
                drivers = store.driver_count(),
                orders = store.order_count(),
                "store seeded"
            );
            store
        }
        None => MemoryStore::new(),
    };

    let shared_state = Arc::new(AppState::new(Arc::new(store)));

    let mut app = api::rest::router(shared_state);
    if let Some(origin) = &config.cors_allow_origin {
        app = api::rest::with_cors(app, origin)?;
    }

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
