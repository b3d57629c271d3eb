// `trigger.get` wrapper.

use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_array, RpcClient};
use crate::error::Error;

impl RpcClient {
    /// Fetch trigger records for exactly the given trigger ids,
    /// selecting the owning host of each.
    ///
    /// Callers must not pass an empty id list: the server either rejects
    /// it or answers with an unfiltered result, so the fetch pipeline
    /// skips this call entirely when no ids are referenced.
    pub async fn trigger_get(&self, trigger_ids: &[String]) -> Result<Vec<Value>, Error> {
        let params = json!({
            "output": "extend",
            "triggerids": trigger_ids,
            "selectHosts": ["host"],
        });

        debug!(ids = trigger_ids.len(), "fetching trigger metadata");
        let result = self.call("trigger.get", params).await?;
        expect_array(result, "trigger.get")
    }
}
