use super::comments::CommentThreads;
use super::egress::{EgressOrder, EgressView};
use super::poller::Poller;
use super::stats::{ReactionStatistic, SessionStats};
use super::RestreamerApi;
use crate::config::DashboardConfig;
use crate::social::{Comment, LoginInfo, SocialError, SocialPlatform};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time;

/// Everything the dashboard displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub egresses: Vec<EgressView>,
    pub session: SessionStats,
    pub comments: CommentThreads,
    pub reactions: ReactionStatistic,
}

/// Result of an on-demand comment fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentFetch {
    /// Video id or profile id missing
    Skipped,
    /// Thread cleared without contacting the platform
    Reset,
    /// New comments appended (possibly zero) and totals updated
    Appended(usize),
    /// Upstream failed or reported an error; nothing changed
    Empty,
    /// The dashboard was inactive or re-activated before the result landed
    Discarded,
}

#[derive(Debug, Default)]
struct DashboardState {
    epoch: u64,
    active: bool,
    view: DashboardView,
}

impl DashboardState {
    fn accepts(&self, epoch: u64) -> bool {
        self.active && self.epoch == epoch
    }
}

type SharedState = Arc<RwLock<DashboardState>>;

/// Aggregates egresses, session counters and live comments for one channel.
///
/// Each activation opens a new epoch. A write lands only while the dashboard
/// is active under the epoch it was started in.
pub struct PublicationDashboard {
    config: DashboardConfig,
    api: Arc<dyn RestreamerApi>,
    social: Arc<dyn SocialPlatform>,
    state: SharedState,
    poller: Mutex<Option<Poller>>,
    social_session: Mutex<Option<LoginInfo>>,
    fetch_gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PublicationDashboard {
    pub fn new(
        config: DashboardConfig,
        api: Arc<dyn RestreamerApi>,
        social: Arc<dyn SocialPlatform>,
    ) -> Self {
        Self {
            config,
            api,
            social,
            state: Arc::new(RwLock::new(DashboardState::default())),
            poller: Mutex::new(None),
            social_session: Mutex::new(None),
            fetch_gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub async fn is_active(&self) -> bool {
        self.state.read().await.active
    }

    /// Snapshot of the current view
    pub async fn view(&self) -> DashboardView {
        self.state.read().await.view.clone()
    }

    /// Comment threads that have something to show
    pub async fn displayed_comments(&self) -> Vec<(String, Vec<Comment>)> {
        let state = self.state.read().await;
        state
            .view
            .comments
            .non_empty()
            .map(|(id, items)| (id.to_string(), items.to_vec()))
            .collect()
    }

    /// Start both poll cycles from a fresh view
    pub async fn activate(&self) -> Result<()> {
        self.config.validate()?;

        let mut slot = self.poller.lock().await;
        if slot.is_some() {
            return Err(anyhow!(
                "Dashboard for channel {} is already active",
                self.config.channel_id
            ));
        }

        let epoch = {
            let mut state = self.state.write().await;
            state.epoch += 1;
            state.active = true;
            state.view = DashboardView::default();
            state.epoch
        };

        let period = self.config.poll_interval();
        let mut poller = Poller::new();

        let egresses = Arc::new(EgressCycle {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            epoch,
            channel_id: self.config.channel_id.clone(),
            service_ids: self.config.service_ids.clone(),
        });
        poller.spawn_every("egress", period, move || {
            let cycle = Arc::clone(&egresses);
            async move { cycle.run().await }
        });

        let sessions = Arc::new(SessionCycle {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            epoch,
            protocols: self.config.session_protocols.clone(),
        });
        poller.spawn_every("session", period, move || {
            let cycle = Arc::clone(&sessions);
            async move { cycle.run().await }
        });

        *slot = Some(poller);
        log::info!(
            "Publication dashboard for channel {} activated (epoch {})",
            self.config.channel_id,
            epoch
        );
        Ok(())
    }

    /// Stop polling and refuse any further writes. Idempotent.
    pub async fn deactivate(&self) {
        // The slot stays locked until the state is inactive and the poller is gone
        let mut slot = self.poller.lock().await;

        {
            let mut state = self.state.write().await;
            if !state.active {
                return;
            }
            state.active = false;
        }

        if let Some(mut poller) = slot.take() {
            poller.shutdown().await;
        }
        drop(slot);

        self.fetch_gates.lock().await.clear();

        log::info!(
            "Publication dashboard for channel {} deactivated",
            self.config.channel_id
        );
    }

    /// Store credentials obtained by an external login flow
    pub async fn set_social_session(&self, info: LoginInfo) {
        *self.social_session.lock().await = Some(info);
    }

    pub async fn order_egress(&self, egress_id: &str, order: EgressOrder) -> Result<bool> {
        order
            .apply(self.api.as_ref(), &self.config.channel_id, egress_id)
            .await
    }

    /// Fetch new comments and reaction totals for a live video, or clear its
    /// thread when `reset` is set.
    ///
    /// Fetches for the same video id are serialized; a reset never waits for
    /// them. Upstream failures and timeouts yield `CommentFetch::Empty` and
    /// leave the view untouched. A failed login is returned as `Err` and
    /// retried on the next call.
    pub async fn fetch_comments(
        &self,
        video_id: Option<&str>,
        profile_id: Option<&str>,
        reset: bool,
    ) -> Result<CommentFetch> {
        let (video_id, profile_id) = match (non_empty(video_id), non_empty(profile_id)) {
            (Some(v), Some(p)) => (v, p),
            _ => return Ok(CommentFetch::Skipped),
        };

        if reset {
            let mut state = self.state.write().await;
            if !state.active {
                return Ok(CommentFetch::Discarded);
            }
            state.view.comments.reset(video_id);
            return Ok(CommentFetch::Reset);
        }

        let epoch = {
            let state = self.state.read().await;
            if !state.active {
                return Ok(CommentFetch::Discarded);
            }
            state.epoch
        };

        let gate = self.fetch_gate(video_id).await;
        let outcome = {
            let _serialized = gate.lock().await;
            self.fetch_and_apply(video_id, profile_id, epoch).await
        };
        self.release_gate(video_id, gate).await;

        outcome
    }

    async fn fetch_and_apply(
        &self,
        video_id: &str,
        profile_id: &str,
        epoch: u64,
    ) -> Result<CommentFetch> {
        let access_token = self.access_token(profile_id).await?;
        let since = self.state.read().await.view.comments.cursor(video_id);
        log::debug!("Fetching comments for video {} since {:?}", video_id, since);

        let limit = self.config.social_timeout();
        let fetched = time::timeout(limit, async {
            tokio::join!(
                self.social.live_comments(video_id, &access_token, since),
                self.social.live_reactions(video_id, &access_token),
            )
        })
        .await;

        let (comments, reactions) = match fetched {
            Ok(results) => results,
            Err(_) => {
                log::warn!("Comment fetch for video {} timed out after {:?}", video_id, limit);
                return Ok(CommentFetch::Empty);
            }
        };

        let (page, reactions) = match (comments, reactions) {
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Comment fetch for video {} failed: {:#}", video_id, e);
                return Ok(CommentFetch::Empty);
            }
            (Ok(page), Ok(reactions)) => {
                if let Some(error) = page.error.as_ref().or(reactions.error.as_ref()) {
                    log::warn!("Platform reported an error for video {}: {}", video_id, error);
                    return Ok(CommentFetch::Empty);
                }
                (page, reactions)
            }
        };

        let statistic = ReactionStatistic {
            likes: reactions.total_count(),
            comments: page.total_count(),
        };
        let fresh: Vec<Comment> = page.data.into_iter().map(Comment::with_picture).collect();
        let count = fresh.len();

        let mut state = self.state.write().await;
        if !state.accepts(epoch) {
            log::debug!("Dropping comments for video {} after teardown", video_id);
            return Ok(CommentFetch::Discarded);
        }
        state.view.comments.append(video_id, fresh);
        state.view.reactions = statistic;

        Ok(CommentFetch::Appended(count))
    }

    async fn fetch_gate(&self, video_id: &str) -> Arc<Mutex<()>> {
        let mut gates = self.fetch_gates.lock().await;
        Arc::clone(gates.entry(video_id.to_string()).or_default())
    }

    /// Forget the gate once no other fetch holds or waits on it
    async fn release_gate(&self, video_id: &str, gate: Arc<Mutex<()>>) {
        let mut gates = self.fetch_gates.lock().await;
        let idle = gates
            .get(video_id)
            .is_some_and(|current| Arc::ptr_eq(current, &gate) && Arc::strong_count(&gate) == 2);
        if idle {
            gates.remove(video_id);
        }
    }

    /// Token for `profile_id`, logging in first when there is no session
    async fn access_token(&self, profile_id: &str) -> Result<String> {
        let limit = self.config.social_timeout();
        let logged_in = time::timeout(limit, self.social.is_logged_in())
            .await
            .context("Timed out checking social login status")?
            .context("Failed to check social login status")?;

        let mut session = self.social_session.lock().await;
        if !logged_in || session.is_none() {
            let info = time::timeout(limit, self.social.login())
                .await
                .context("Timed out waiting for social login")?
                .context("Social login failed")?;
            *session = Some(info);
        }

        session
            .as_ref()
            .and_then(|info| info.access_token_for(profile_id))
            .map(str::to_string)
            .ok_or_else(|| SocialError::MissingAccessToken(profile_id.to_string()).into())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Poll cycle A: replace the egress list
struct EgressCycle {
    api: Arc<dyn RestreamerApi>,
    state: SharedState,
    epoch: u64,
    channel_id: String,
    service_ids: Vec<String>,
}

impl EgressCycle {
    async fn run(&self) {
        let processes = match self
            .api
            .list_ingest_egresses(&self.channel_id, &self.service_ids)
            .await
        {
            Ok(processes) => processes,
            Err(e) => {
                log::warn!("Failed to list egresses for channel {}: {:#}", self.channel_id, e);
                return;
            }
        };

        let egresses: Vec<EgressView> = processes.into_iter().map(EgressView::from).collect();

        let mut state = self.state.write().await;
        if state.accepts(self.epoch) {
            state.view.egresses = egresses;
        }
    }
}

/// Poll cycle B: replace the session counters
struct SessionCycle {
    api: Arc<dyn RestreamerApi>,
    state: SharedState,
    epoch: u64,
    protocols: Vec<String>,
}

impl SessionCycle {
    async fn run(&self) {
        let summary = match self.api.current_sessions(&self.protocols).await {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("Failed to read current sessions: {:#}", e);
                return;
            }
        };

        let mut state = self.state.write().await;
        if state.accepts(self.epoch) {
            state.view.session = SessionStats::from(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publication::{Process, SessionSummary};
    use crate::social::mock::ScriptedSdk;
    use crate::social::{FacebookClient, PAGE_ME_ID};
    use async_trait::async_trait;
    use serde_json::json;

    struct IdleRestreamer;

    #[async_trait]
    impl RestreamerApi for IdleRestreamer {
        async fn list_ingest_egresses(&self, _: &str, _: &[String]) -> Result<Vec<Process>> {
            Ok(Vec::new())
        }

        async fn current_sessions(&self, _: &[String]) -> Result<SessionSummary> {
            Ok(SessionSummary::default())
        }

        async fn start_egress(&self, _: &str, _: &str) -> Result<bool> {
            Ok(true)
        }

        async fn stop_egress(&self, _: &str, _: &str) -> Result<bool> {
            Ok(true)
        }
    }

    fn dashboard(sdk: ScriptedSdk) -> PublicationDashboard {
        PublicationDashboard::new(
            DashboardConfig::new("ch-1"),
            Arc::new(IdleRestreamer),
            Arc::new(FacebookClient::new(Arc::new(sdk))),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_gates_are_released() -> Result<()> {
        let sdk = ScriptedSdk::new()
            .connected("u-1", "user-token")
            .respond("/me/accounts", json!({"data": []}))
            .respond("/v1/comments", json!({"data": []}))
            .respond("/v1/reactions", json!({"data": []}))
            .respond("/v2/comments", json!({"data": []}))
            .respond("/v2/reactions", json!({"data": []}));
        let dashboard = dashboard(sdk);
        dashboard.activate().await?;

        for video in ["v1", "v2", "v1"] {
            let outcome = dashboard.fetch_comments(Some(video), Some(PAGE_ME_ID), false).await?;
            assert_eq!(outcome, CommentFetch::Appended(0));
        }
        assert!(dashboard.fetch_gates.lock().await.is_empty());

        dashboard.deactivate().await;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_drops_gates_of_hung_fetches() -> Result<()> {
        let dashboard = dashboard(ScriptedSdk::new());
        dashboard.activate().await?;

        let gate = dashboard.fetch_gate("v9").await;
        let held = gate.lock().await;
        assert_eq!(dashboard.fetch_gates.lock().await.len(), 1);

        dashboard.deactivate().await;
        assert!(dashboard.fetch_gates.lock().await.is_empty());

        drop(held);
        dashboard.release_gate("v9", gate).await;
        assert!(dashboard.fetch_gates.lock().await.is_empty());
        Ok(())
    }
}
