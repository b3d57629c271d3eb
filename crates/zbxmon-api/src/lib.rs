// zbxmon-api: Async JSON-RPC client for Zabbix-compatible monitoring servers

pub mod client;
pub mod envelope;
pub mod error;
pub mod methods;
pub mod transport;

pub use client::{AuthCarrier, RpcClient};
pub use error::Error;
pub use methods::events::EventAction;
pub use transport::{TlsMode, TransportConfig};
