//! Persisted configuration for zbxmon.
//!
//! TOML settings (server registry + dashboard state), a separate
//! widget-config file, credential resolution (env + keyring +
//! plaintext), and translation to `zbxmon_core::MonitorServer`. The
//! foreground view and the widget host both depend on this crate.

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

pub mod schema;
pub mod store;
pub mod widgets;

pub use schema::{AuthMode, Config, DashboardState, ServerEntry};
pub use store::SettingsStore;
pub use widgets::WidgetStore;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for server {id}")]
    NoCredentials { id: i64 },

    #[error("no server with id {id} in the registry")]
    UnknownServer { id: i64 },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Platform paths ──────────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
#[must_use]
pub fn config_path() -> PathBuf {
    project_config_dir().join("config.toml")
}

/// Resolve the widget-config file path, beside the settings file.
#[must_use]
pub fn widgets_path() -> PathBuf {
    project_config_dir().join("widgets.toml")
}

/// Directory for per-server problem snapshots.
#[must_use]
pub fn snapshot_cache_dir() -> PathBuf {
    ProjectDirs::from("com", "zbxmon", "zbxmon").map_or_else(
        || home_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

fn project_config_dir() -> PathBuf {
    ProjectDirs::from("com", "zbxmon", "zbxmon").map_or_else(
        || home_fallback(".config"),
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

fn home_fallback(subdir: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(subdir);
    p.push("zbxmon");
    p
}
