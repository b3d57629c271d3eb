// ── Widget refresh pipeline ──
//
// The widget surface runs out-of-process from the foreground view and
// renders exclusively from the snapshot cache. This module owns the
// jobs that keep that cache fresh, plus narrow interfaces to the
// host's config storage, repeating scheduler, and renderer.

mod service;

pub use service::{WidgetHost, WidgetService};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{FilterCounts, ProblemFilter};
use crate::model::{MonitorServer, ServerId};

/// Host-assigned widget instance id.
pub type WidgetId = u32;

/// Floor for the refresh interval; saves clamp up to this.
pub const MIN_REFRESH_INTERVAL_MINS: u32 = 5;

/// Default refresh interval for newly configured widgets.
pub const DEFAULT_REFRESH_INTERVAL_MINS: u32 = 5;

/// Per-widget configuration, persisted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Which server this widget watches.
    pub server_id: ServerId,
    /// Minutes between scheduled refreshes.
    pub refresh_interval_mins: u32,
    #[serde(flatten)]
    pub filter: ProblemFilter,
}

impl WidgetConfig {
    #[must_use]
    pub fn new(server_id: ServerId) -> Self {
        Self {
            server_id,
            refresh_interval_mins: DEFAULT_REFRESH_INTERVAL_MINS,
            filter: ProblemFilter::default(),
        }
    }

    /// The same config with the interval clamped to the floor.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.refresh_interval_mins = self.refresh_interval_mins.max(MIN_REFRESH_INTERVAL_MINS);
        self
    }

    /// Scheduler cadence for this config, post-clamp.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        let mins = u64::from(self.refresh_interval_mins.max(MIN_REFRESH_INTERVAL_MINS));
        Duration::from_secs(mins * 60)
    }
}

/// Work items accepted by the widget service queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetJob {
    /// Fetch, cache, and repaint one widget.
    Refresh(WidgetId),
    /// Refresh every configured widget.
    RefreshAll,
    /// Flip the acknowledged filter and repaint from cache only.
    ToggleShowAcknowledged(WidgetId),
    /// Flip the maintenance filter and repaint from cache only.
    ToggleShowInMaintenance(WidgetId),
}

/// Everything the renderer needs for one widget frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSummary {
    /// `None` for the unconfigured placeholder frame.
    pub server_id: Option<ServerId>,
    pub server_name: Option<String>,
    pub counts: FilterCounts,
    pub filter: ProblemFilter,
    /// When the problems behind the counts were fetched.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set when the refresh behind this frame failed; the counts then
    /// come from the previous snapshot.
    pub stale_error: Option<String>,
}

impl WidgetSummary {
    /// Placeholder frame for a widget with no configuration.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }
}

// ── Host interfaces ──────────────────────────────────────────────

/// Per-widget configuration storage.
pub trait WidgetConfigStore: Send + Sync {
    fn load(&self, widget: WidgetId) -> Option<WidgetConfig>;
    fn save(&self, widget: WidgetId, config: WidgetConfig);
    fn remove(&self, widget: WidgetId);
    /// Ids of every configured widget.
    fn list(&self) -> Vec<WidgetId>;
}

/// Resolves server ids to full server records.
pub trait ServerDirectory: Send + Sync {
    fn server_by_id(&self, id: ServerId) -> Option<MonitorServer>;
}

/// The host's repeating-callback scheduler. Callbacks are expected to
/// enqueue [`WidgetJob::Refresh`] for the widget.
pub trait RefreshScheduler: Send + Sync {
    fn schedule(&self, widget: WidgetId, every: Duration);
    fn cancel(&self, widget: WidgetId);
}

/// Pushes a finished frame to the host's renderer.
pub trait Repaint: Send + Sync {
    fn request_repaint(&self, widget: WidgetId, summary: WidgetSummary);
}

// ── Tests ───────────────────────────────────────────────────────────
