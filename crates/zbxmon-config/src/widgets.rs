// ── Widget config store ──
//
// Per-widget configuration in `widgets.toml`, keyed by widget id. The
// `WidgetConfigStore` trait is infallible on mutation, so disk write
// failures are logged and the in-memory image stays authoritative for
// the life of the process.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use zbxmon_core::widget::{WidgetConfig, WidgetConfigStore, WidgetId};

use crate::ConfigError;

/// On-disk shape: `[widgets.<id>]` tables. TOML keys are strings, so
/// ids are stringified on the way out and parsed back on the way in.
#[derive(Debug, Default, Deserialize, Serialize)]
struct WidgetsFile {
    #[serde(default)]
    widgets: BTreeMap<String, WidgetConfig>,
}

/// File-backed widget configuration store.
pub struct WidgetStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<WidgetId, WidgetConfig>>,
}

impl WidgetStore {
    /// Load widget configs from `path`. A missing file is an empty
    /// store; a malformed one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let file: WidgetsFile =
                    toml::from_str(&text).map_err(|e| ConfigError::Parse {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                let mut entries = BTreeMap::new();
                for (key, config) in file.widgets {
                    match key.parse::<WidgetId>() {
                        Ok(id) => {
                            entries.insert(id, config);
                        }
                        Err(_) => {
                            warn!(key, "ignoring widget entry with a non-numeric id");
                        }
                    }
                }
                entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), widgets = entries.len(), "widget configs loaded");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Load widget configs from the platform config path.
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(crate::widgets_path())
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<WidgetId, WidgetConfig>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_to_disk(&self, entries: &BTreeMap<WidgetId, WidgetConfig>) {
        let file = WidgetsFile {
            widgets: entries
                .iter()
                .map(|(id, config)| (id.to_string(), *config))
                .collect(),
        };
        let result = (|| -> Result<(), ConfigError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let text = toml::to_string_pretty(&file)?;
            std::fs::write(&self.path, text)?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "widget config write failed");
        }
    }
}

impl WidgetConfigStore for WidgetStore {
    fn load(&self, widget: WidgetId) -> Option<WidgetConfig> {
        self.entries().get(&widget).copied()
    }

    fn save(&self, widget: WidgetId, config: WidgetConfig) {
        let mut entries = self.entries();
        entries.insert(widget, config);
        self.write_to_disk(&entries);
    }

    fn remove(&self, widget: WidgetId) {
        let mut entries = self.entries();
        if entries.remove(&widget).is_some() {
            self.write_to_disk(&entries);
        }
    }

    fn list(&self) -> Vec<WidgetId> {
        self.entries().keys().copied().collect()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
