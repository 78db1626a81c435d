use crate::publication::services;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Protocols counted towards viewers and bandwidth
pub const SESSION_PROTOCOLS: [&str; 4] = ["ffmpeg", "hls", "rtmp", "srt"];

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

pub const DEFAULT_SOCIAL_TIMEOUT_MS: u64 = 10_000;

/// Publication dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub channel_id: String,

    /// Egress services shown on the dashboard
    #[serde(default = "default_service_ids")]
    pub service_ids: Vec<String>,

    #[serde(default = "default_session_protocols")]
    pub session_protocols: Vec<String>,

    /// Period of both poll cycles
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound for a single social platform call
    #[serde(default = "default_social_timeout_ms")]
    pub social_timeout_ms: u64,
}

fn default_service_ids() -> Vec<String> {
    services::service_ids()
}

fn default_session_protocols() -> Vec<String> {
    SESSION_PROTOCOLS.iter().map(|p| p.to_string()).collect()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_social_timeout_ms() -> u64 {
    DEFAULT_SOCIAL_TIMEOUT_MS
}

impl DashboardConfig {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            service_ids: default_service_ids(),
            session_protocols: default_session_protocols(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            social_timeout_ms: DEFAULT_SOCIAL_TIMEOUT_MS,
        }
    }

    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(config).context("Failed to parse dashboard config")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let value: Value = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel_id.trim().is_empty() {
            return Err(anyhow!("channel_id must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than zero"));
        }
        if self.social_timeout_ms == 0 {
            return Err(anyhow!("social_timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn social_timeout(&self) -> Duration {
        Duration::from_millis(self.social_timeout_ms)
    }
}
