use serde::{Deserialize, Serialize};

/// Session counters as reported by the restreamer API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub bitrate_kbit: u64,
}

/// Viewer count and outgoing bandwidth (kbit/s) shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub viewer: u64,
    pub bandwidth: u64,
}

impl From<SessionSummary> for SessionStats {
    fn from(summary: SessionSummary) -> Self {
        Self {
            viewer: summary.sessions,
            bandwidth: summary.bitrate_kbit,
        }
    }
}

/// Totals of the most recent comment fetch; overwritten, never summed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStatistic {
    pub likes: u64,
    pub comments: u64,
}
