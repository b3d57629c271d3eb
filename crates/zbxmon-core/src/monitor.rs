// ── Foreground monitor session ──
//
// Owns the periodic sync loop for the currently selected server and
// the reactive channels a UI reads. One monitor serves one server: to
// watch a different server, stop this monitor and build a fresh one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;
use crate::error::CoreError;
use crate::model::{MonitorServer, Problem};
use crate::repository::{ProblemRepository, ACK_MESSAGE, CLOSE_MESSAGE};

/// How often the foreground view re-syncs.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Sync activity, observable alongside the problem list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    /// Last sync failed; the problem list still holds the previous
    /// good result.
    Failed(String),
}

/// Handle to the monitoring session. Cheap to clone; all clones share
/// the same state.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    server: MonitorServer,
    repository: ProblemRepository,
    cache: SnapshotCache,
    refresh_interval: Duration,

    problems: watch::Sender<Arc<Vec<Problem>>>,
    sync_state: watch::Sender<SyncState>,
    last_sync: watch::Sender<Option<DateTime<Utc>>>,

    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    #[must_use]
    pub fn new(server: MonitorServer, repository: ProblemRepository, cache: SnapshotCache) -> Self {
        Self::with_interval(server, repository, cache, DEFAULT_REFRESH_INTERVAL)
    }

    #[must_use]
    pub fn with_interval(
        server: MonitorServer,
        repository: ProblemRepository,
        cache: SnapshotCache,
        refresh_interval: Duration,
    ) -> Self {
        let (problems, _) = watch::channel(Arc::new(Vec::new()));
        let (sync_state, _) = watch::channel(SyncState::Idle);
        let (last_sync, _) = watch::channel(None);
        Self {
            inner: Arc::new(MonitorInner {
                server,
                repository,
                cache,
                refresh_interval,
                problems,
                sync_state,
                last_sync,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn server(&self) -> &MonitorServer {
        &self.inner.server
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Start the periodic refresh loop. The first sync runs right
    /// away; later ones follow the configured interval. Starting an
    /// already-running monitor is a no-op.
    pub async fn start(&self) {
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            return;
        }
        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        *task = Some(tokio::spawn(refresh_task(monitor, cancel)));
        info!(server = self.inner.server.id, "monitor started");
    }

    /// Cancel the refresh loop and wait for it to wind down. A stopped
    /// monitor stays stopped; build a fresh one to resume watching.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        debug!(server = self.inner.server.id, "monitor stopped");
    }

    // ── Sync ─────────────────────────────────────────────────────

    /// One sync cycle: fetch, publish, write the snapshot cache.
    ///
    /// A cycle that loses the race with [`Monitor::stop`] discards its
    /// result: the problem list, last-sync time, and cache stay
    /// untouched, and the sync state settles back to idle.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let _ = self.inner.sync_state.send(SyncState::Syncing);

        let result = self.inner.repository.fetch_problems(&self.inner.server).await;

        if self.inner.cancel.is_cancelled() {
            debug!(server = self.inner.server.id, "sync cancelled; discarding result");
            let _ = self.inner.sync_state.send(SyncState::Idle);
            return Ok(());
        }

        match result {
            Ok(problems) => {
                if let Err(e) = self.inner.cache.save(self.inner.server.id, &problems) {
                    warn!(error = %e, "snapshot write failed");
                }
                let count = problems.len();
                let _ = self.inner.problems.send(Arc::new(problems));
                let _ = self.inner.last_sync.send(Some(Utc::now()));
                let _ = self.inner.sync_state.send(SyncState::Idle);
                debug!(server = self.inner.server.id, problems = count, "sync complete");
                Ok(())
            }
            Err(e) => {
                let _ = self.inner.sync_state.send(SyncState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Drop the on-disk snapshot, then sync. Until the fetch lands the
    /// cache reads empty rather than stale.
    pub async fn force_refresh(&self) -> Result<(), CoreError> {
        self.inner.cache.clear(self.inner.server.id);
        self.refresh().await
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Acknowledge (or unacknowledge) one event, then re-fetch on
    /// success so every surface observes the server's new state.
    pub async fn acknowledge(&self, event_id: &str, set_acknowledged: bool) -> bool {
        let accepted = self
            .inner
            .repository
            .acknowledge(&self.inner.server, event_id, set_acknowledged, ACK_MESSAGE)
            .await;
        if accepted {
            if let Err(e) = self.force_refresh().await {
                warn!(error = %e, "refresh after acknowledge failed");
            }
        }
        accepted
    }

    /// Force-close one event, then re-fetch on success.
    pub async fn close(&self, event_id: &str) -> bool {
        let accepted = self
            .inner
            .repository
            .close(&self.inner.server, event_id, CLOSE_MESSAGE)
            .await;
        if accepted {
            if let Err(e) = self.force_refresh().await {
                warn!(error = %e, "refresh after close failed");
            }
        }
        accepted
    }

    // ── State observation ────────────────────────────────────────

    /// Current problem list (cheap snapshot).
    #[must_use]
    pub fn problems_snapshot(&self) -> Arc<Vec<Problem>> {
        self.inner.problems.borrow().clone()
    }

    /// Subscribe to problem list changes.
    #[must_use]
    pub fn problems(&self) -> watch::Receiver<Arc<Vec<Problem>>> {
        self.inner.problems.subscribe()
    }

    /// Problem list changes as a `Stream`, starting with the current
    /// value.
    #[must_use]
    pub fn problems_stream(&self) -> WatchStream<Arc<Vec<Problem>>> {
        WatchStream::new(self.inner.problems.subscribe())
    }

    /// Subscribe to sync activity changes.
    #[must_use]
    pub fn sync_state(&self) -> watch::Receiver<SyncState> {
        self.inner.sync_state.subscribe()
    }

    /// When the last successful sync finished.
    #[must_use]
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_sync.borrow()
    }

    /// Subscribe to last-sync changes.
    #[must_use]
    pub fn last_sync_watch(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_sync.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically sync problems from the server. The interval's first
/// tick fires immediately, which is what gives the sync-on-select
/// refresh.
async fn refresh_task(monitor: Monitor, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.refresh_interval);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = monitor.refresh().await {
                    warn!(server = monitor.inner.server.id, error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
