// RPC HTTP client
//
// Wraps `reqwest::Client` with endpoint normalization, envelope handling,
// and dual-mode auth carriage. Method wrappers (problems, triggers,
// events, auth) are implemented as inherent methods via separate files
// to keep this module focused on transport mechanics.

use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::envelope::{RpcRequest, RpcResponse};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Well-known endpoint path segment every request posts to.
const ENDPOINT_PATH: &str = "api_jsonrpc.php";

/// Cap on response-body text carried inside error variants.
const BODY_SNIPPET_LEN: usize = 512;

/// How the API/session token travels with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCarrier {
    /// `Authorization: Bearer <token>` header (API-token installs).
    Header,
    /// Inline `auth` field in the request body (session installs and
    /// servers predating header auth).
    Body,
}

/// Raw JSON-RPC client for one monitoring server.
///
/// Holds the normalized endpoint, the HTTP client, and the current token
/// (if any). Request ids come from a per-client atomic counter so
/// concurrent calls stay distinguishable in logs and captures.
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<(SecretString, AuthCarrier)>,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create an unauthenticated client for the given base URL.
    ///
    /// The URL may be a bare host, a base URL with or without a trailing
    /// slash, or a fully qualified endpoint; see [`normalize_endpoint`].
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let endpoint = normalize_endpoint(base_url)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            token: None,
            request_id: AtomicU64::new(1),
        })
    }

    /// Attach a token with the given carriage mode.
    pub fn with_token(mut self, token: SecretString, carrier: AuthCarrier) -> Self {
        self.token = Some((token, carrier));
        self
    }

    pub(crate) fn set_token(&mut self, token: SecretString, carrier: AuthCarrier) {
        self.token = Some((token, carrier));
    }

    /// The normalized endpoint this client posts to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether a token is currently attached.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ── Request mechanics ────────────────────────────────────────────

    /// Issue one JSON-RPC call and return the `result` payload.
    ///
    /// Failure layers stay distinguishable: [`Error::Transport`] when no
    /// response was obtained, [`Error::Http`] on a non-2xx status,
    /// [`Error::Api`] when the body carries an `error` object, and
    /// [`Error::Deserialization`] when the envelope itself is unreadable.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let mut request = RpcRequest::new(method, params, id);

        if let Some((token, AuthCarrier::Body)) = &self.token {
            request.auth = Some(token.expose_secret());
        }

        debug!(method, id, "rpc call");

        let mut req = self.http.post(self.endpoint.clone()).json(&request);
        if let Some((token, AuthCarrier::Header)) = &self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        trace!(status = status.as_u16(), body_len = body.len(), "rpc response");

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let envelope: RpcResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: snippet(&body),
            })?;

        if let Some(err) = envelope.error {
            let data = err.detail();
            return Err(Error::Api {
                code: err.code,
                message: err.message,
                data,
            });
        }

        envelope.result.ok_or_else(|| Error::Deserialization {
            message: "response contains neither result nor error".into(),
            body: snippet(&body),
        })
    }
}

/// Normalize a user-supplied server URL into the full endpoint URL.
///
/// Trims a trailing `api_jsonrpc.php` segment if present, then appends
/// exactly one, so `zbx.example.com`, `https://zbx.example.com/`, and
/// `https://zbx.example.com/api_jsonrpc.php` all resolve to the same
/// endpoint. A missing scheme defaults to `https`.
pub fn normalize_endpoint(base: &str) -> Result<Url, Error> {
    let mut trimmed = base.trim().trim_end_matches('/');
    if let Some(stripped) = trimmed.strip_suffix(ENDPOINT_PATH) {
        trimmed = stripped.trim_end_matches('/');
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    Ok(Url::parse(&format!("{with_scheme}/{ENDPOINT_PATH}"))?)
}

/// Unwrap an array-shaped `result`, or report the method that misbehaved.
pub(crate) fn expect_array(result: Value, method: &str) -> Result<Vec<Value>, Error> {
    match result {
        Value::Array(items) => Ok(items),
        other => Err(Error::Deserialization {
            message: format!("{method} result is not an array"),
            body: snippet(&other.to_string()),
        }),
    }
}

fn snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LEN {
        body.to_owned()
    } else {
        body.chars().take(BODY_SNIPPET_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_endpoint_to_bare_base() {
        let url = normalize_endpoint("https://zbx.example.com").unwrap();
        assert_eq!(url.as_str(), "https://zbx.example.com/api_jsonrpc.php");
    }

    #[test]
    fn normalize_strips_trailing_slash() {
        let url = normalize_endpoint("https://zbx.example.com/").unwrap();
        assert_eq!(url.as_str(), "https://zbx.example.com/api_jsonrpc.php");
    }

    #[test]
    fn normalize_keeps_existing_endpoint_path() {
        let url = normalize_endpoint("https://zbx.example.com/api_jsonrpc.php").unwrap();
        assert_eq!(url.as_str(), "https://zbx.example.com/api_jsonrpc.php");
    }

    #[test]
    fn normalize_preserves_subpath_installs() {
        let url = normalize_endpoint("https://example.com/zabbix/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/zabbix/api_jsonrpc.php");
    }

    #[test]
    fn normalize_defaults_to_https_for_bare_hosts() {
        let url = normalize_endpoint("zbx.example.com").unwrap();
        assert_eq!(url.as_str(), "https://zbx.example.com/api_jsonrpc.php");
    }

    #[test]
    fn normalize_keeps_explicit_http() {
        let url = normalize_endpoint("http://10.0.0.5/api_jsonrpc.php").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5/api_jsonrpc.php");
    }

    #[test]
    fn expect_array_rejects_objects() {
        let err = expect_array(serde_json::json!({"weird": true}), "problem.get").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
