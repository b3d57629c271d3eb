// ── Server records ──

use secrecy::SecretString;
use zbxmon_api::AuthCarrier;

/// User-assigned server identity, stable across edits.
pub type ServerId = i64;

/// How a server authenticates API calls.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Long-lived API token, sent on every request.
    ApiToken(SecretString),
    /// Username/password pair, exchanged for a session token when a
    /// client is built.
    Password {
        username: String,
        password: SecretString,
    },
}

/// One configured monitoring server.
#[derive(Debug, Clone)]
pub struct MonitorServer {
    pub id: ServerId,
    /// Display name; fall back to [`MonitorServer::display_name`] when
    /// the user left it blank.
    pub name: String,
    /// Base URL as the user entered it; normalized by the api layer.
    pub url: String,
    pub credential: Credential,
    /// Token carriage the deployment expects.
    pub auth_carrier: AuthCarrier,
}

impl MonitorServer {
    /// The configured name, or `Server {id}` when none was given.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Server {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
