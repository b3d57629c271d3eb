// zbxmon-core: Problem data layer between zbxmon-api and consumers
// (foreground view, widgets).

pub mod cache;
pub mod error;
pub mod filter;
pub mod model;
pub mod monitor;
pub mod normalize;
pub mod repository;
pub mod widget;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{Snapshot, SnapshotCache};
pub use error::{CoreError, FetchStage};
pub use filter::{FilterCounts, ProblemFilter};
pub use monitor::{Monitor, SyncState, DEFAULT_REFRESH_INTERVAL};
pub use repository::ProblemRepository;
pub use widget::{
    RefreshScheduler, Repaint, ServerDirectory, WidgetConfig, WidgetConfigStore, WidgetHost,
    WidgetId, WidgetJob, WidgetService, WidgetSummary,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AuthCarrier, Credential, MonitorServer, Problem, ServerId, Severity, Tag, TriggerMeta,
};
