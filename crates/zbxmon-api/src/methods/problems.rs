// `problem.get` wrapper.

use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_array, RpcClient};
use crate::error::Error;

impl RpcClient {
    /// Fetch the active problem list.
    ///
    /// `problem.get` with extended output plus acknowledge, suppression,
    /// and tag sub-selections. Records come back untyped; the caller
    /// decodes them field by field.
    pub async fn problem_get(&self) -> Result<Vec<Value>, Error> {
        let params = json!({
            "output": "extend",
            "selectAcknowledges": "extend",
            "selectSuppressionData": "extend",
            "selectTags": "extend",
        });

        debug!("fetching problems");
        let result = self.call("problem.get", params).await?;
        expect_array(result, "problem.get")
    }
}
