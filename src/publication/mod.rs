pub mod comments;
pub mod dashboard;
pub mod egress;
pub mod poller;
pub mod services;
pub mod stats;

pub use comments::CommentThreads;
pub use dashboard::{CommentFetch, DashboardView, PublicationDashboard};
pub use egress::{EgressOrder, EgressView, Process, Progress};
pub use poller::Poller;
pub use stats::{ReactionStatistic, SessionStats, SessionSummary};

use anyhow::Result;
use async_trait::async_trait;

/// Process/session API of the restreamer core consumed by the dashboard
#[async_trait]
pub trait RestreamerApi: Send + Sync {
    /// Egress processes of `channel_id` belonging to one of `services`
    async fn list_ingest_egresses(&self, channel_id: &str, services: &[String]) -> Result<Vec<Process>>;

    /// Aggregate session counters for the given protocols
    async fn current_sessions(&self, protocols: &[String]) -> Result<SessionSummary>;

    async fn start_egress(&self, channel_id: &str, egress_id: &str) -> Result<bool>;

    async fn stop_egress(&self, channel_id: &str, egress_id: &str) -> Result<bool>;
}
