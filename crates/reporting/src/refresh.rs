//! Timer-driven refresh loop with token sequencing.
//!
//! Every refresh takes a token from a monotonically increasing counter. A
//! refresh that completes after a newer one has started is discarded, so
//! overlapping timer and manual refreshes cannot publish out of order.

use crate::generator::DashboardSource;
use campaign_core::config::DashboardConfig;
use campaign_core::types::{DashboardData, DashboardSnapshot};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

pub type SnapshotReceiver = watch::Receiver<Option<Arc<DashboardSnapshot>>>;
type SnapshotSender = watch::Sender<Option<Arc<DashboardSnapshot>>>;

/// Issues refresh tokens and tells whether a token is still the newest.
#[derive(Debug, Default)]
pub struct RefreshSequencer {
    issued: AtomicU64,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh and returns its token. Tokens start at 1.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest()
    }
}

/// Shortest timer period the loop will run with.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub initial_delay: Duration,
    pub refresh_delay: Duration,
}

impl From<&DashboardConfig> for RefreshSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            interval: config.refresh_interval().max(MIN_REFRESH_INTERVAL),
            initial_delay: config.initial_load_delay(),
            refresh_delay: config.refresh_delay(),
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

/// Publishes `data` under `token` unless a newer refresh has started or
/// already been published. Returns whether the snapshot was applied.
pub fn publish(
    sequencer: &RefreshSequencer,
    sender: &SnapshotSender,
    token: u64,
    data: DashboardData,
) -> bool {
    let applied = sender.send_if_modified(|slot| {
        let newer_published = slot.as_ref().is_some_and(|s| s.token > token);
        if newer_published || !sequencer.is_current(token) {
            return false;
        }
        *slot = Some(Arc::new(DashboardSnapshot {
            token,
            data,
            refreshed_at: Utc::now(),
        }));
        true
    });

    if applied {
        metrics::counter!("dashboard.refresh.applied").increment(1);
        info!(token, "Dashboard refreshed");
    } else {
        metrics::counter!("dashboard.refresh.stale").increment(1);
        debug!(token, latest = sequencer.latest(), "Discarded stale refresh");
    }
    applied
}

/// Owner of the background refresh task. Dropping it stops the timer and
/// cancels refreshes still in flight.
pub struct RefreshHandle {
    task: JoinHandle<()>,
    manual: mpsc::Sender<()>,
    updates: SnapshotReceiver,
    sequencer: Arc<RefreshSequencer>,
}

impl RefreshHandle {
    /// Spawns the refresh loop on the current tokio runtime: an initial load,
    /// then one refresh per interval tick plus any manual requests.
    pub fn spawn<S: DashboardSource>(source: S, settings: RefreshSettings) -> Self {
        let (sender, updates) = watch::channel(None);
        let (manual, manual_rx) = mpsc::channel(16);
        let sequencer = Arc::new(RefreshSequencer::new());

        let task = tokio::spawn(run_loop(
            source,
            settings.clone(),
            sequencer.clone(),
            Arc::new(sender),
            manual_rx,
        ));

        info!(
            interval_secs = settings.interval.as_secs(),
            "Dashboard refresh loop started"
        );

        Self {
            task,
            manual,
            updates,
            sequencer,
        }
    }

    /// Requests an immediate refresh. Returns false if the request was dropped.
    pub fn refresh_now(&self) -> bool {
        match self.manual.try_send(()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Manual refresh dropped: {}", e);
                false
            }
        }
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.updates.clone()
    }

    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.updates.borrow().clone()
    }

    pub fn latest_token(&self) -> u64 {
        self.sequencer.latest()
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Dashboard refresh loop stopped");
    }
}

async fn run_loop<S: DashboardSource>(
    mut source: S,
    settings: RefreshSettings,
    sequencer: Arc<RefreshSequencer>,
    sender: Arc<SnapshotSender>,
    mut manual: mpsc::Receiver<()>,
) {
    // Dropping the set aborts every in-flight refresh.
    let mut in_flight: JoinSet<()> = JoinSet::new();
    let period = settings.interval.max(MIN_REFRESH_INTERVAL);
    if period != settings.interval {
        warn!(
            requested_ms = settings.interval.as_millis() as u64,
            "Refresh interval below minimum, using {}s",
            MIN_REFRESH_INTERVAL.as_secs()
        );
    }
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    start_refresh(&mut in_flight, &mut source, settings.initial_delay, &sequencer, &sender);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                start_refresh(&mut in_flight, &mut source, settings.refresh_delay, &sequencer, &sender);
            }
            request = manual.recv() => match request {
                Some(()) => {
                    start_refresh(&mut in_flight, &mut source, settings.refresh_delay, &sequencer, &sender);
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
}

fn start_refresh<S: DashboardSource>(
    in_flight: &mut JoinSet<()>,
    source: &mut S,
    delay: Duration,
    sequencer: &Arc<RefreshSequencer>,
    sender: &Arc<SnapshotSender>,
) {
    let token = sequencer.begin();
    let data = source.next_batch();
    let sequencer = sequencer.clone();
    let sender = sender.clone();
    debug!(token, delay_ms = delay.as_millis() as u64, "Refresh started");

    in_flight.spawn(async move {
        tokio::time::sleep(delay).await;
        publish(&sequencer, &sender, token, data);
    });
}
