use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the pulsemon server, e.g. `http://monitor.example.com:8080`.
    pub server_url: String,
    /// API key minted for this target at registration.
    pub api_key: String,
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_report_interval() -> u64 {
    60
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Ingestion endpoint for this agent's key.
    pub fn ingest_url(&self) -> String {
        format!(
            "{}/v1/ingest/{}",
            self.server_url.trim_end_matches('/'),
            self.api_key
        )
    }
}
