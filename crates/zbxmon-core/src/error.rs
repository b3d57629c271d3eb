// ── Core error types ──
//
// User-facing errors from zbxmon-core. These are NOT wire-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<zbxmon_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use std::fmt;

use thiserror::Error;

use crate::model::ServerId;

/// Which part of a sync was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Login,
    Problems,
    TriggerMeta,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Problems => write!(f, "problem fetch"),
            Self::TriggerMeta => write!(f, "trigger metadata fetch"),
        }
    }
}

/// Error type shared across the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Sync errors ──────────────────────────────────────────────────
    #[error("{stage} failed: {message}")]
    SyncFailed { stage: FetchStage, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Server not found: {id}")]
    ServerNotFound { id: ServerId },

    #[error("Cache write failed at {path}: {message}")]
    CacheWrite { path: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The server's application error code, if one was returned.
        code: Option<i64>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a wire error with the sync stage that was executing.
    ///
    /// Connection, authentication, and timeout failures keep their own
    /// identity (they already say what went wrong); application and
    /// decode failures are tagged with the stage so "problem fetch
    /// failed" and "trigger metadata fetch failed" stay distinguishable.
    #[must_use]
    pub fn sync(stage: FetchStage, err: zbxmon_api::Error) -> Self {
        match Self::from(err) {
            Self::Api { message, .. } | Self::Internal(message) => {
                Self::SyncFailed { stage, message }
            }
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<zbxmon_api::Error> for CoreError {
    fn from(err: zbxmon_api::Error) -> Self {
        match err {
            zbxmon_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            zbxmon_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            zbxmon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            zbxmon_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            zbxmon_api::Error::Http { status, body } => CoreError::Api {
                message: format!("HTTP {status}: {body}"),
                code: None,
            },
            zbxmon_api::Error::Api {
                code,
                message,
                data,
            } => CoreError::Api {
                message: match data {
                    Some(detail) if !detail.is_empty() => format!("{message}: {detail}"),
                    _ => message,
                },
                code: Some(code),
            },
            zbxmon_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
