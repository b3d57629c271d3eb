// JSON-RPC 2.0 envelope types.
//
// Zabbix-compatible servers answer every method through one envelope:
// `{jsonrpc, result, id}` on success, `{jsonrpc, error: {code, message,
// data}, id}` on application failure. Response fields are all defaulted
// so a sloppy server build cannot make the envelope unreadable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing request envelope.
///
/// `auth` is only present in body-carriage mode; header-carriage servers
/// reject requests that include it alongside a bearer header.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<&'a str>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(method: &'a str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
            auth: None,
        }
    }
}

/// Incoming response envelope. Exactly one of `result`/`error` is
/// populated on a conforming server.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
    #[serde(default)]
    pub id: Value,
}

/// The `error` object of a failed call.
#[derive(Debug, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcError {
    /// The `data` field as display text. Zabbix sends a string here, but
    /// the type is not guaranteed across server versions.
    pub fn detail(&self) -> Option<String> {
        self.data.as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
