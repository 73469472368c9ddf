use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    pub(crate) backend_url: String,
    #[serde(default = "default_poll_interval")]
    pub(crate) poll_interval_secs: u64,
    #[serde(default)]
    pub(crate) api_token: Option<String>,
    /// Automation job whose latest execution log is polled for the timeline.
    #[serde(default)]
    pub(crate) job_id: Option<i64>,
    /// Repository path queried for configuration version history.
    #[serde(default)]
    pub(crate) config_path: Option<String>,
}

fn default_poll_interval() -> u64 {
    3
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    let url = config.backend_url.trim();
    if url.is_empty() {
        anyhow::bail!("config must set backend_url");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("backend_url must start with http:// or https://");
    }
    if config.poll_interval_secs == 0 {
        anyhow::bail!("poll_interval_secs must be at least 1");
    }
    Ok(())
}

pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}
