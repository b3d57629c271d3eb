// ── TOML config schema ──

use serde::{Deserialize, Serialize};

use zbxmon_core::{ProblemFilter, ServerId};

/// Top-level settings file: `[dashboard]` plus `[[servers]]` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardState,

    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl Config {
    #[must_use]
    pub fn server(&self, id: ServerId) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.id == id)
    }
}

/// Foreground view state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardState {
    /// Which server the foreground view is watching.
    pub selected_server: Option<ServerId>,

    #[serde(default)]
    pub show_acknowledged: bool,

    #[serde(default)]
    pub show_in_maintenance: bool,
}

impl DashboardState {
    /// The dashboard's flags as a problem filter.
    #[must_use]
    pub fn filter(&self) -> ProblemFilter {
        ProblemFilter {
            show_acknowledged: self.show_acknowledged,
            show_in_maintenance: self.show_in_maintenance,
        }
    }
}

/// How a server entry authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Long-lived API token.
    #[default]
    Token,
    /// Username/password session login.
    Password,
}

/// One server in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerEntry {
    /// User-assigned id; stable across edits and referenced by widget
    /// configs and snapshot files.
    pub id: ServerId,

    /// Display name. Blank falls back to `Server {id}` at display time.
    #[serde(default)]
    pub name: String,

    /// Base URL as entered; normalized by the api layer.
    pub url: String,

    #[serde(default)]
    pub auth_mode: AuthMode,

    /// Send the token in the request body instead of the HTTP header
    /// (older servers do not accept header tokens).
    #[serde(default)]
    pub auth_in_body: bool,

    /// API token, plaintext (prefer keyring or `api_token_env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable name containing the API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// Username for password auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password, plaintext (prefer keyring).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_server_entry_parses_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [[servers]]
            id = 1
            url = "https://zabbix.example.com"
            "#,
        )
        .unwrap();

        let entry = config.server(1).unwrap();
        assert_eq!(entry.auth_mode, AuthMode::Token);
        assert!(!entry.auth_in_body);
        assert_eq!(entry.name, "");
        assert_eq!(config.server(2), None);
    }

    #[test]
    fn dashboard_state_round_trips() {
        let mut config = Config::default();
        config.dashboard.selected_server = Some(3);
        config.dashboard.show_acknowledged = true;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert!(parsed.dashboard.filter().show_acknowledged);
        assert!(!parsed.dashboard.filter().show_in_maintenance);
    }

    #[test]
    fn auth_mode_uses_snake_case_on_the_wire() {
        let config: Config = toml::from_str(
            r#"
            [[servers]]
            id = 1
            url = "https://zabbix.example.com"
            auth_mode = "password"
            username = "admin"
            "#,
        )
        .unwrap();
        assert_eq!(config.servers[0].auth_mode, AuthMode::Password);
    }

    #[test]
    fn absent_credential_fields_stay_out_of_the_file() {
        let config = Config {
            dashboard: DashboardState::default(),
            servers: vec![ServerEntry {
                id: 1,
                url: "https://zabbix.example.com".to_owned(),
                ..ServerEntry::default()
            }],
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("api_token"));
        assert!(!text.contains("password"));
    }
}
