use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Fixed-period background jobs sharing one shutdown signal.
///
/// Each job ticks immediately and then once per period. A tick runs to
/// completion before the next one is scheduled, so ticks of the same job
/// never overlap.
pub struct Poller {
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);
        Self {
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Must be called inside a tokio runtime
    pub fn spawn_every<F, Fut>(&mut self, label: &'static str, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => tick().await,
                }
            }

            log::debug!("{} poller stopped", label);
        });

        self.handles.push(handle);
    }

    pub fn job_count(&self) -> usize {
        self.handles.len()
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }

    /// Stop every job, including ticks that are mid-flight. Safe to call
    /// more than once.
    pub async fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());

        for handle in &self.handles {
            handle.abort();
        }

        while let Some(handle) = self.handles.pop() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::warn!("Poll job ended abnormally: {}", e);
                }
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropping without `shutdown()` still stops the jobs, it just cannot wait
/// for them to unwind.
impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        for handle in &self.handles {
            handle.abort();
        }
    }
}
