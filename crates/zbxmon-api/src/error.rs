use thiserror::Error;

/// Top-level error type for the `zbxmon-api` crate.
///
/// Keeps the four failure layers distinguishable for callers: transport
/// (no response obtained), protocol (non-2xx HTTP), application (an `error`
/// object in an HTTP-200 body), and decode (envelope did not parse).
/// `zbxmon-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, disabled account, expired session).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// Non-success HTTP status with a response body snippet.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Application ─────────────────────────────────────────────────
    /// Structured error from the RPC server (the `error` object in an
    /// otherwise successful response).
    #[error("API error {code}: {message}")]
    Api {
        code: i64,
        message: String,
        /// Server-side detail string (Zabbix puts the useful part here).
        data: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The response envelope did not parse, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is an authentication problem where
    /// re-login might resolve it.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if the request timed out at the transport layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The application-level message with server detail appended, when
    /// available. Falls back to `Display` for every other variant.
    pub fn detail(&self) -> String {
        match self {
            Self::Api {
                message,
                data: Some(data),
                ..
            } if !data.is_empty() => format!("{message} {data}"),
            other => other.to_string(),
        }
    }
}
