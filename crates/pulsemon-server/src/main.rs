use anyhow::Result;
use chrono::Utc;
use pulsemon_server::app;
use pulsemon_server::config::ServerConfig;
use pulsemon_server::state::AppState;
use pulsemon_storage::MetricStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    pulsemon_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pulsemon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");

    let config = match ServerConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = config_path, error = %e, "Config not loaded, using defaults");
            ServerConfig::default()
        }
    };

    run_server(config).await
}

async fn run_server(config: ServerConfig) -> Result<()> {
    tracing::info!(
        http_port = config.http_port,
        data_dir = %config.database.data_dir,
        db = %config.database.redacted_url(),
        retention_days = config.retention_days,
        "pulsemon-server starting"
    );

    std::fs::create_dir_all(&config.database.data_dir)?;
    let store = Arc::new(MetricStore::connect(&config.database.url).await?);

    let state = AppState {
        store: store.clone(),
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    // Hourly retention sweep; dropped samples never affect targets
    let retention_days = config.retention_days;
    let prune_store = store.clone();
    let prune_handle = tokio::spawn(async move {
        if retention_days == 0 {
            tracing::info!("Sample pruning disabled");
            return;
        }
        let mut tick = interval(Duration::from_secs(3600));
        loop {
            tick.tick().await;
            let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
            match prune_store.prune_samples_before(cutoff).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Pruned expired samples")
                }
                Err(e) => tracing::error!(error = %e, "Sample pruning failed"),
                _ => {}
            }
        }
    });

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    tracing::info!(http = %http_addr, "Server started");

    tokio::select! {
        result = server.with_graceful_shutdown(async { signal::ctrl_c().await.ok(); }) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    prune_handle.abort();
    tracing::info!("Server stopped");

    Ok(())
}
