mod collector;
mod config;

use anyhow::Result;
use collector::SampleCollector;
use serde_json::Value;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pulsemon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = config::AgentConfig::load(&config_path)?;
    tracing::info!(
        server = %config.server_url,
        interval_secs = config.report_interval_secs,
        "pulsemon-agent starting"
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let ingest_url = config.ingest_url();

    let mut collector = SampleCollector::new();
    // First CPU reading has no refresh delta behind it
    let _ = collector.collect();

    let mut tick = interval(Duration::from_secs(config.report_interval_secs));
    tick.tick().await; // immediate first tick

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let sample = collector.collect();
                match client.post(&ingest_url).json(&sample).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        tracing::debug!(cpu = sample.cpu_usage, mem = sample.memory_usage, "Sample reported");
                    }
                    Ok(resp) => {
                        let status = resp.status();
                        let body: Value = resp.json().await.unwrap_or(Value::Null);
                        tracing::warn!(
                            status = status.as_u16(),
                            err_msg = %body["err_msg"].as_str().unwrap_or(""),
                            "Server rejected sample"
                        );
                    }
                    Err(e) => {
                        // Dropped samples are acceptable; next tick retries
                        tracing::warn!(error = %e, "Failed to report sample");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}
