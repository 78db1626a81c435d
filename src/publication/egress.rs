use super::RestreamerApi;
use anyhow::{anyhow, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Runtime state of an egress process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub order: String,
    /// Seconds until the next reconnect attempt, -1 when not reconnecting
    #[serde(default = "not_reconnecting")]
    pub reconnect: i64,
}

fn not_reconnecting() -> i64 {
    -1
}

/// Egress process as listed by the restreamer API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub service: String,
    /// Position among egresses of the same service
    #[serde(default, deserialize_with = "string_or_number")]
    pub index: String,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub social_live_video_id: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("expected string or number, got {}", other))),
    }
}

/// Dashboard row for one egress; rebuilt from scratch on every poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressView {
    pub id: String,
    pub name: String,
    pub service: String,
    pub index: String,
    pub progress: Progress,
    pub social_live_video_id: Option<String>,
    pub profile_id: Option<String>,
}

impl From<Process> for EgressView {
    fn from(p: Process) -> Self {
        Self {
            id: p.id,
            name: p.name,
            service: p.service,
            index: p.index,
            progress: p.progress,
            social_live_video_id: p.social_live_video_id,
            profile_id: p.profile_id,
        }
    }
}

impl EgressView {
    pub fn is_reconnecting(&self) -> bool {
        self.progress.reconnect != -1
    }

    /// Whether comments can be fetched for this egress
    pub fn has_social_video(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.social_live_video_id) && present(&self.profile_id)
    }
}

/// Operator command for an egress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EgressOrder {
    Start,
    Restart,
    Stop,
}

impl FromStr for EgressOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "restart" => Ok(Self::Restart),
            "stop" => Ok(Self::Stop),
            other => Err(anyhow!("Unknown egress order: {}", other)),
        }
    }
}

impl fmt::Display for EgressOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Restart => "restart",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}

impl EgressOrder {
    /// Send the order; restart only starts again if the stop succeeded
    pub async fn apply(self, api: &dyn RestreamerApi, channel_id: &str, egress_id: &str) -> Result<bool> {
        let accepted = match self {
            Self::Start => api.start_egress(channel_id, egress_id).await?,
            Self::Stop => api.stop_egress(channel_id, egress_id).await?,
            Self::Restart => {
                if api.stop_egress(channel_id, egress_id).await? {
                    api.start_egress(channel_id, egress_id).await?
                } else {
                    false
                }
            }
        };

        log::info!("Egress {} order {}: accepted={}", egress_id, self, accepted);
        Ok(accepted)
    }
}
