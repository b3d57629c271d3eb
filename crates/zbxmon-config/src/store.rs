// ── Settings store ──
//
// Loads the settings file through figment (defaults, then TOML, then
// ZBXMON_-prefixed environment overrides), keeps the current value on
// a watch channel, and writes edits back with pretty TOML. Credential
// material resolves through env, then the OS keyring, then plaintext.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

use zbxmon_core::model::{AuthCarrier, Credential, MonitorServer, ServerId};
use zbxmon_core::ServerDirectory;

use crate::schema::{AuthMode, Config, DashboardState, ServerEntry};
use crate::ConfigError;

const KEYRING_SERVICE: &str = "zbxmon";

/// The settings file plus its in-memory image.
///
/// Every successful edit is written to disk and re-published on the
/// watch channel, so consumers holding a [`SettingsStore::subscribe`]
/// receiver observe each change.
pub struct SettingsStore {
    path: PathBuf,
    current: watch::Sender<Arc<Config>>,
    // Serializes read-modify-write cycles across clones of the handle.
    edit_lock: Mutex<()>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file is an empty config;
    /// a malformed one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ZBXMON_").split("_"))
            .extract()?;

        debug!(path = %path.display(), servers = config.servers.len(), "settings loaded");
        let (current, _) = watch::channel(Arc::new(config));
        Ok(Self {
            path,
            current,
            edit_lock: Mutex::new(()),
        })
    }

    /// Load settings from the platform config path.
    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(crate::config_path())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Current settings (cheap snapshot).
    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        self.current.borrow().clone()
    }

    /// Subscribe to settings changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.current.subscribe()
    }

    // ── Edits ────────────────────────────────────────────────────

    /// Add a server, or replace the entry with the same id.
    pub fn upsert_server(&self, entry: ServerEntry) -> Result<(), ConfigError> {
        self.edit(|config| {
            match config.servers.iter_mut().find(|s| s.id == entry.id) {
                Some(existing) => *existing = entry,
                None => config.servers.push(entry),
            }
        })
    }

    /// Remove a server from the registry. Removing an unknown id is a
    /// no-op; widget configs pointing at it degrade to placeholders.
    pub fn remove_server(&self, id: ServerId) -> Result<(), ConfigError> {
        self.edit(|config| {
            config.servers.retain(|s| s.id != id);
            if config.dashboard.selected_server == Some(id) {
                config.dashboard.selected_server = None;
            }
        })
    }

    /// Persist the foreground view's state.
    pub fn set_dashboard(&self, dashboard: DashboardState) -> Result<(), ConfigError> {
        self.edit(|config| config.dashboard = dashboard)
    }

    fn edit(&self, apply: impl FnOnce(&mut Config)) -> Result<(), ConfigError> {
        let guard = self.edit_lock.lock();
        let _guard = match guard {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut config = (*self.config()).clone();
        apply(&mut config);
        self.write_to_disk(&config)?;
        let _ = self.current.send(Arc::new(config));
        Ok(())
    }

    fn write_to_disk(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    // ── Server resolution ────────────────────────────────────────

    /// Resolve a registry entry into a ready-to-use server record,
    /// including its credential.
    pub fn resolve_server(&self, id: ServerId) -> Result<MonitorServer, ConfigError> {
        let config = self.config();
        let entry = config
            .server(id)
            .ok_or(ConfigError::UnknownServer { id })?;
        resolve_entry(entry)
    }
}

impl ServerDirectory for SettingsStore {
    fn server_by_id(&self, id: ServerId) -> Option<MonitorServer> {
        match self.resolve_server(id) {
            Ok(server) => Some(server),
            Err(e) => {
                warn!(server = id, error = %e, "cannot resolve server");
                None
            }
        }
    }
}

// ── Credential resolution ────────────────────────────────────────────

/// Build a [`MonitorServer`] from a registry entry, resolving its
/// credential through the configured chain.
pub fn resolve_entry(entry: &ServerEntry) -> Result<MonitorServer, ConfigError> {
    if entry.url.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("server {} has no url", entry.id),
        });
    }
    let credential = match entry.auth_mode {
        AuthMode::Token => Credential::ApiToken(resolve_api_token(entry)?),
        AuthMode::Password => {
            let (username, password) = resolve_password(entry)?;
            Credential::Password { username, password }
        }
    };
    Ok(MonitorServer {
        id: entry.id,
        name: entry.name.clone(),
        url: entry.url.clone(),
        credential,
        auth_carrier: if entry.auth_in_body {
            AuthCarrier::Body
        } else {
            AuthCarrier::Header
        },
    })
}

/// API token chain: named env var, then keyring, then plaintext.
fn resolve_api_token(entry: &ServerEntry) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = entry.api_token_env {
        if let Ok(value) = std::env::var(env_name) {
            return Ok(SecretString::from(value));
        }
    }

    if let Ok(keyring_entry) =
        keyring::Entry::new(KEYRING_SERVICE, &format!("server-{}/api-token", entry.id))
    {
        if let Ok(secret) = keyring_entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = entry.api_token {
        warn!(server = entry.id, "using plaintext api token from the config file");
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials { id: entry.id })
}

/// Password chain: `ZBXMON_PASSWORD`, then keyring, then plaintext.
/// The username comes from the entry or `ZBXMON_USERNAME`.
fn resolve_password(entry: &ServerEntry) -> Result<(String, SecretString), ConfigError> {
    let username = entry
        .username
        .clone()
        .or_else(|| std::env::var("ZBXMON_USERNAME").ok())
        .ok_or(ConfigError::NoCredentials { id: entry.id })?;

    if let Ok(password) = std::env::var("ZBXMON_PASSWORD") {
        return Ok((username, SecretString::from(password)));
    }

    if let Ok(keyring_entry) =
        keyring::Entry::new(KEYRING_SERVICE, &format!("server-{}/password", entry.id))
    {
        if let Ok(password) = keyring_entry.get_password() {
            return Ok((username, SecretString::from(password)));
        }
    }

    if let Some(ref password) = entry.password {
        warn!(server = entry.id, "using plaintext password from the config file");
        return Ok((username, SecretString::from(password.clone())));
    }

    Err(ConfigError::NoCredentials { id: entry.id })
}

// ── Tests ───────────────────────────────────────────────────────────
