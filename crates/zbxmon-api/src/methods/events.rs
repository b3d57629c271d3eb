// `event.acknowledge` wrapper.

use serde_json::json;
use tracing::debug;

use crate::client::RpcClient;
use crate::error::Error;

/// Server action codes for `event.acknowledge`.
///
/// The server treats the action as a bitmask; the pipeline only ever
/// sends these three single-bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Force-close the event (requires manual-close on the trigger).
    Close,
    /// Mark the event as acknowledged.
    Acknowledge,
    /// Remove an earlier acknowledgement.
    Unacknowledge,
}

impl EventAction {
    pub fn code(self) -> u32 {
        match self {
            Self::Close => 1,
            Self::Acknowledge => 2,
            Self::Unacknowledge => 16,
        }
    }
}

impl RpcClient {
    /// Apply one action to one event, with an operator message.
    ///
    /// The server's result payload (the affected event ids) carries no
    /// extra information on success, so it is discarded; any failure
    /// surfaces through the usual error taxonomy.
    pub async fn event_acknowledge(
        &self,
        event_id: &str,
        action: EventAction,
        message: &str,
    ) -> Result<(), Error> {
        let params = json!({
            "eventids": [event_id],
            "action": action.code(),
            "message": message,
        });

        debug!(event_id, action = action.code(), "acknowledging event");
        let _ = self.call("event.acknowledge", params).await?;
        Ok(())
    }
}
