// ── Monitoring domain model ──
//
// Canonical representations of the entities zbxmon works with. Problems
// and their trigger metadata keep the wire's numeric-as-string encoding
// for flag fields so cached snapshots round-trip byte-for-byte with
// what the server sent.

pub mod problem;
pub mod server;
pub mod severity;
pub mod trigger;

// ── Re-exports ──────────────────────────────────────────────────────

pub use problem::{Problem, Tag};
pub use server::{Credential, MonitorServer, ServerId};
pub use severity::Severity;
pub use trigger::TriggerMeta;

// Token carriage lives in the api crate; re-exported so consumers can
// describe a server without depending on zbxmon-api directly.
pub use zbxmon_api::AuthCarrier;
