// ── Widget refresh service ──
//
// Explicit job queue with a single dispatcher. Refresh jobs hit the
// network and are spawned per widget with at most one in flight per
// widget id; filter toggles run inline and read only the snapshot
// cache, so they work with no connectivity at all.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;
use crate::repository::ProblemRepository;

use super::{
    Repaint, RefreshScheduler, ServerDirectory, WidgetConfig, WidgetConfigStore, WidgetId,
    WidgetJob, WidgetSummary,
};

const JOB_QUEUE_DEPTH: usize = 64;

/// The host-side collaborators a widget service drives.
#[derive(Clone)]
pub struct WidgetHost {
    pub configs: Arc<dyn WidgetConfigStore>,
    pub servers: Arc<dyn ServerDirectory>,
    pub scheduler: Arc<dyn RefreshScheduler>,
    pub repaint: Arc<dyn Repaint>,
}

/// Handle to the widget refresh service. Cheap to clone; all clones
/// feed the same queue.
#[derive(Clone)]
pub struct WidgetService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    repository: ProblemRepository,
    cache: SnapshotCache,
    host: WidgetHost,

    job_tx: mpsc::Sender<WidgetJob>,
    job_rx: Mutex<Option<mpsc::Receiver<WidgetJob>>>,

    cancel: CancellationToken,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

/// Which filter flag a toggle job flips.
#[derive(Clone, Copy)]
enum Toggle {
    Acknowledged,
    Maintenance,
}

impl WidgetService {
    #[must_use]
    pub fn new(repository: ProblemRepository, cache: SnapshotCache, host: WidgetHost) -> Self {
        let (job_tx, job_rx) = mpsc::channel(JOB_QUEUE_DEPTH);
        Self {
            inner: Arc::new(ServiceInner {
                repository,
                cache,
                host,
                job_tx,
                job_rx: Mutex::new(Some(job_rx)),
                cancel: CancellationToken::new(),
                dispatcher: Mutex::new(None),
            }),
        }
    }

    // ── Service lifecycle ────────────────────────────────────────

    /// Spawn the dispatcher loop. Starting twice is a no-op.
    pub async fn start(&self) {
        let mut dispatcher = self.inner.dispatcher.lock().await;
        if dispatcher.is_some() {
            return;
        }
        let Some(job_rx) = self.inner.job_rx.lock().await.take() else {
            return;
        };
        let service = self.clone();
        *dispatcher = Some(tokio::spawn(dispatch_task(service, job_rx)));
        debug!("widget service started");
    }

    /// Stop accepting jobs and wait for the dispatcher to wind down.
    /// Refreshes already in flight run to completion; background work
    /// is not user-cancellable.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.dispatcher.lock().await.take() {
            let _ = handle.await;
        }
        debug!("widget service stopped");
    }

    // ── Job intake ───────────────────────────────────────────────

    /// Queue a job. Jobs dropped because the service has stopped are
    /// logged and forgotten; the repeating schedule re-delivers.
    pub async fn enqueue(&self, job: WidgetJob) {
        if self.inner.job_tx.send(job).await.is_err() {
            warn!(?job, "widget job dropped; service is stopped");
        }
    }

    /// Persist a widget's configuration (interval clamped to the
    /// floor), register its repeating schedule, and queue its first
    /// refresh.
    pub async fn configure(&self, widget: WidgetId, config: WidgetConfig) {
        let config = config.clamped();
        self.inner.host.configs.save(widget, config);
        self.inner
            .host
            .scheduler
            .schedule(widget, config.refresh_interval());
        info!(
            widget,
            server = config.server_id,
            interval_mins = config.refresh_interval_mins,
            "widget configured"
        );
        self.enqueue(WidgetJob::Refresh(widget)).await;
    }

    /// Forget a deleted widget: drop its configuration and cancel its
    /// schedule. The snapshot cache stays; other widgets may share it.
    pub fn remove(&self, widget: WidgetId) {
        self.inner.host.configs.remove(widget);
        self.inner.host.scheduler.cancel(widget);
        debug!(widget, "widget removed");
    }

    // ── Job execution ────────────────────────────────────────────

    async fn dispatch(&self, job: WidgetJob, in_flight: &mut HashMap<WidgetId, JoinHandle<()>>) {
        match job {
            WidgetJob::Refresh(widget) => self.spawn_refresh(widget, in_flight),
            WidgetJob::RefreshAll => {
                for widget in self.inner.host.configs.list() {
                    self.spawn_refresh(widget, in_flight);
                }
            }
            WidgetJob::ToggleShowAcknowledged(widget) => self.toggle(widget, Toggle::Acknowledged),
            WidgetJob::ToggleShowInMaintenance(widget) => self.toggle(widget, Toggle::Maintenance),
        }
    }

    /// Spawn a refresh unless one for this widget is still running; a
    /// duplicate enqueued mid-flight is dropped, not queued.
    fn spawn_refresh(&self, widget: WidgetId, in_flight: &mut HashMap<WidgetId, JoinHandle<()>>) {
        if let Some(handle) = in_flight.get(&widget) {
            if !handle.is_finished() {
                debug!(widget, "refresh already in flight; dropping duplicate");
                return;
            }
        }
        let service = self.clone();
        in_flight.insert(
            widget,
            tokio::spawn(async move { service.refresh_widget(widget).await }),
        );
    }

    /// One widget refresh: config, server record, fetch, cache write,
    /// counts, repaint. Fetch failures repaint the previous snapshot's
    /// counts with the error attached instead of going blank.
    async fn refresh_widget(&self, widget: WidgetId) {
        let Some(config) = self.inner.host.configs.load(widget) else {
            debug!(widget, "widget not configured; painting placeholder");
            self.inner
                .host
                .repaint
                .request_repaint(widget, WidgetSummary::unconfigured());
            return;
        };
        let Some(server) = self.inner.host.servers.server_by_id(config.server_id) else {
            warn!(widget, server = config.server_id, "widget references unknown server");
            self.inner
                .host
                .repaint
                .request_repaint(widget, WidgetSummary::unconfigured());
            return;
        };

        let summary = match self.inner.repository.fetch_problems(&server).await {
            Ok(problems) => {
                if let Err(e) = self.inner.cache.save(server.id, &problems) {
                    warn!(widget, error = %e, "snapshot write failed");
                }
                WidgetSummary {
                    server_id: Some(server.id),
                    server_name: Some(server.display_name()),
                    counts: config.filter.counts(&problems),
                    filter: config.filter,
                    fetched_at: Some(Utc::now()),
                    stale_error: None,
                }
            }
            Err(e) => {
                warn!(widget, error = %e, "widget refresh failed; repainting from cache");
                let snapshot = self.inner.cache.load(server.id);
                WidgetSummary {
                    server_id: Some(server.id),
                    server_name: Some(server.display_name()),
                    counts: config.filter.counts(&snapshot.problems),
                    filter: config.filter,
                    fetched_at: snapshot.fetched_at,
                    stale_error: Some(e.to_string()),
                }
            }
        };
        debug!(
            widget,
            total = summary.counts.total,
            visible = summary.counts.visible,
            "widget repaint"
        );
        self.inner.host.repaint.request_repaint(widget, summary);
    }

    /// Flip one persisted filter flag and repaint from the snapshot
    /// cache. Never touches the network.
    fn toggle(&self, widget: WidgetId, which: Toggle) {
        let Some(mut config) = self.inner.host.configs.load(widget) else {
            debug!(widget, "toggle on unconfigured widget ignored");
            return;
        };
        match which {
            Toggle::Acknowledged => {
                config.filter.show_acknowledged = !config.filter.show_acknowledged;
            }
            Toggle::Maintenance => {
                config.filter.show_in_maintenance = !config.filter.show_in_maintenance;
            }
        }
        self.inner.host.configs.save(widget, config);

        let snapshot = self.inner.cache.load(config.server_id);
        let summary = WidgetSummary {
            server_id: Some(config.server_id),
            server_name: self
                .inner
                .host
                .servers
                .server_by_id(config.server_id)
                .map(|s| s.display_name()),
            counts: config.filter.counts(&snapshot.problems),
            filter: config.filter,
            fetched_at: snapshot.fetched_at,
            stale_error: None,
        };
        debug!(widget, visible = summary.counts.visible, "filter toggled");
        self.inner.host.repaint.request_repaint(widget, summary);
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Drain the job queue until cancelled, then let in-flight refreshes
/// finish.
async fn dispatch_task(service: WidgetService, mut job_rx: mpsc::Receiver<WidgetJob>) {
    let cancel = service.inner.cancel.clone();
    let mut in_flight: HashMap<WidgetId, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            job = job_rx.recv() => {
                let Some(job) = job else { break };
                in_flight.retain(|_, handle| !handle.is_finished());
                service.dispatch(job, &mut in_flight).await;
            }
        }
    }

    for handle in in_flight.into_values() {
        let _ = handle.await;
    }
}
