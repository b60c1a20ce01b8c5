//! Cache statistics polling
//!
//! The poller refreshes a shared [`StatsBoard`] right away and then on a fixed
//! interval. Poll failures are logged and otherwise ignored: the board keeps its
//! last values and the next tick is the retry.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::backend::Backend;
use crate::core::models::{CacheStats, TransportError};

/// Default polling cadence
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Display strings for the three stats counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsDisplay {
    pub hit_rate: String,
    pub total_requests: String,
    pub cached_videos: String,
}

impl Default for StatsDisplay {
    fn default() -> Self {
        Self::from_stats(&CacheStats::default())
    }
}

impl StatsDisplay {
    pub fn from_stats(stats: &CacheStats) -> Self {
        Self {
            // f64 Display prints 0.0 as "0" and 66.67 as "66.67"
            hit_rate: format!("{}%", stats.hit_rate()),
            total_requests: stats.total_requests().to_string(),
            cached_videos: stats.total_cached().to_string(),
        }
    }
}

/// Last successfully fetched statistics
#[derive(Debug, Default)]
pub struct StatsBoard {
    inner: RwLock<BoardState>,
}

#[derive(Debug, Clone, Default)]
struct BoardState {
    snapshot: Option<CacheStats>,
    display: StatsDisplay,
    updated_at: Option<DateTime<Utc>>,
    failures: u64,
}

impl StatsBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> StatsDisplay {
        self.inner.read().display.clone()
    }

    pub fn snapshot(&self) -> Option<CacheStats> {
        self.inner.read().snapshot.clone()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().updated_at
    }

    /// Poll failures since creation
    pub fn failures(&self) -> u64 {
        self.inner.read().failures
    }

    fn update(&self, stats: CacheStats) {
        let mut inner = self.inner.write();
        inner.display = StatsDisplay::from_stats(&stats);
        inner.snapshot = Some(stats);
        inner.updated_at = Some(Utc::now());
    }

    fn record_failure(&self) {
        self.inner.write().failures += 1;
    }
}

/// Periodic reader of the cache-stats endpoint.
/// Every method takes `&self`, so it can be shared behind an `Arc`.
pub struct StatsPoller {
    backend: Arc<dyn Backend>,
    board: Arc<StatsBoard>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatsPoller {
    pub fn new(backend: Arc<dyn Backend>, board: Arc<StatsBoard>, period: Duration) -> Self {
        Self {
            backend,
            board,
            period,
            task: Mutex::new(None),
        }
    }

    pub fn board(&self) -> &Arc<StatsBoard> {
        &self.board
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Poll immediately, then every period, until [`stop`](Self::stop).
    /// Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|task| !task.is_finished()) {
            warn!("Stats poller is already running");
            return;
        }

        info!("Starting stats poller every {:?}", self.period);
        let backend = Arc::clone(&self.backend);
        let board = Arc::clone(&self.board);
        let period = self.period;

        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // first tick completes immediately
                ticker.tick().await;
                let _ = poll_into(backend.as_ref(), &board).await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!("Stats poller stopped");
        }
    }

    /// Refresh the board once, outside the cadence
    pub async fn poll_once(&self) -> Result<StatsDisplay, TransportError> {
        poll_into(self.backend.as_ref(), &self.board).await
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_into(
    backend: &dyn Backend,
    board: &StatsBoard,
) -> Result<StatsDisplay, TransportError> {
    match backend.cache_stats().await {
        Ok(stats) => {
            let shown = StatsDisplay::from_stats(&stats);
            debug!(
                "Cache stats: hit rate {}, requests {}, cached {}",
                shown.hit_rate, shown.total_requests, shown.cached_videos
            );
            board.update(stats);
            Ok(shown)
        }
        Err(err) => {
            warn!("Failed to load cache stats: {}", err);
            board.record_failure();
            Err(err)
        }
    }
}
