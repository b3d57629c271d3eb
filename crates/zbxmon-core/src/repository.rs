// ── Problem repository ──
//
// Fetch and mutation front-end for any configured server. The fetch is
// two-phase: active problems first, then trigger metadata for the
// distinct object ids those problems reference, joined by id into the
// final list. Mutations return plain booleans under the write-then-
// refetch model: the server is the only source of truth, and callers
// re-fetch to observe any change.

use std::collections::HashMap;

use tracing::{debug, warn};

use zbxmon_api::{EventAction, RpcClient, TransportConfig};

use crate::error::{CoreError, FetchStage};
use crate::model::{Credential, MonitorServer, Problem, TriggerMeta};
use crate::normalize::{decode_problem, decode_trigger};

/// Default operator message attached to acknowledgements.
pub const ACK_MESSAGE: &str = "Acknowledged from zbxmon";
/// Default operator message attached to manual closes.
pub const CLOSE_MESSAGE: &str = "Closed from zbxmon";

/// Stateless access to any server's problems.
///
/// Every operation builds a fresh client from the server record it is
/// handed, so edits to a server's URL or credentials take effect on the
/// next call with nothing to invalidate.
#[derive(Debug, Clone, Default)]
pub struct ProblemRepository {
    transport: TransportConfig,
}

impl ProblemRepository {
    #[must_use]
    pub fn new(transport: TransportConfig) -> Self {
        Self { transport }
    }

    /// Build an authenticated client for `server`, performing the
    /// session login when the credential is a username/password pair.
    async fn client_for(&self, server: &MonitorServer) -> Result<RpcClient, CoreError> {
        let client = RpcClient::new(&server.url, &self.transport)?;
        match &server.credential {
            Credential::ApiToken(token) => Ok(client.with_token(token.clone(), server.auth_carrier)),
            Credential::Password { username, password } => {
                let mut client = client;
                client
                    .login(username, password, server.auth_carrier)
                    .await
                    .map_err(|e| CoreError::sync(FetchStage::Login, e))?;
                Ok(client)
            }
        }
    }

    // ── Fetch ────────────────────────────────────────────────────────

    /// Fetch the enriched problem list for one server.
    ///
    /// Problem records the server cannot be asked for directly (host
    /// name, manual-close, trigger comments) are joined in from a
    /// second `trigger.get` call covering the distinct object ids of
    /// phase one. A failure in phase one aborts the fetch; a failure in
    /// phase two degrades to per-problem defaults so enrichment can
    /// never block display of the base list.
    pub async fn fetch_problems(&self, server: &MonitorServer) -> Result<Vec<Problem>, CoreError> {
        let client = self.client_for(server).await?;

        let raw = client
            .problem_get()
            .await
            .map_err(|e| CoreError::sync(FetchStage::Problems, e))?;

        let mut problems: Vec<Problem> = raw
            .iter()
            .filter_map(|record| decode_problem(record).ok())
            .collect();

        let object_ids = distinct_object_ids(&problems);
        let lookup = if object_ids.is_empty() {
            debug!(problems = problems.len(), "no object ids to enrich; skipping trigger fetch");
            HashMap::new()
        } else {
            self.fetch_trigger_meta(&client, &object_ids).await
        };
        apply_trigger_meta(&mut problems, &lookup);

        debug!(
            server = server.id,
            problems = problems.len(),
            triggers = lookup.len(),
            "problem fetch complete"
        );
        Ok(problems)
    }

    /// Phase-two fetch, downgraded on failure: a broken trigger lookup
    /// means defaulted host names, not a failed sync.
    async fn fetch_trigger_meta(
        &self,
        client: &RpcClient,
        object_ids: &[String],
    ) -> HashMap<String, TriggerMeta> {
        match client.trigger_get(object_ids).await {
            Ok(raw) => raw
                .iter()
                .filter_map(|record| decode_trigger(record).ok())
                .collect(),
            Err(e) => {
                warn!(error = %e, "trigger metadata fetch failed; defaulting host names");
                HashMap::new()
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Acknowledge (or unacknowledge) one event.
    ///
    /// `true` means the server accepted the change. Every failure kind
    /// is `false` with a logged diagnostic; nothing local is mutated
    /// either way, so callers re-fetch to observe the result.
    pub async fn acknowledge(
        &self,
        server: &MonitorServer,
        event_id: &str,
        set_acknowledged: bool,
        message: &str,
    ) -> bool {
        let action = if set_acknowledged {
            EventAction::Acknowledge
        } else {
            EventAction::Unacknowledge
        };
        self.apply_event_action(server, event_id, action, message)
            .await
    }

    /// Force-close one event. Only meaningful for problems whose
    /// trigger allows manual close.
    pub async fn close(&self, server: &MonitorServer, event_id: &str, message: &str) -> bool {
        self.apply_event_action(server, event_id, EventAction::Close, message)
            .await
    }

    async fn apply_event_action(
        &self,
        server: &MonitorServer,
        event_id: &str,
        action: EventAction,
        message: &str,
    ) -> bool {
        let client = match self.client_for(server).await {
            Ok(client) => client,
            Err(e) => {
                warn!(event_id, error = %e, "event action aborted before the call");
                return false;
            }
        };
        match client.event_acknowledge(event_id, action, message).await {
            Ok(()) => {
                debug!(event_id, "event action accepted");
                true
            }
            Err(e) => {
                warn!(event_id, error = %e, "event action rejected");
                false
            }
        }
    }
}

// ── Join helpers ─────────────────────────────────────────────────────

/// Distinct object ids in first-seen order, skipping the degenerate
/// empty id (it could never name a trigger).
fn distinct_object_ids(problems: &[Problem]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for problem in problems {
        if !problem.objectid.is_empty() && !ids.contains(&problem.objectid) {
            ids.push(problem.objectid.clone());
        }
    }
    ids
}

/// Fold trigger metadata into the problem list.
///
/// Host names fall back to `Host-{objectid}` when the trigger is absent
/// from the lookup, and `Unknown` when the trigger record exists but
/// named no host.
fn apply_trigger_meta(problems: &mut [Problem], lookup: &HashMap<String, TriggerMeta>) {
    for problem in problems {
        match lookup.get(&problem.objectid) {
            Some(meta) => {
                problem.host_name = meta
                    .host
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_owned());
                problem.manual_close.clone_from(&meta.manual_close);
                problem.comments.clone_from(&meta.comments);
            }
            None => {
                problem.host_name = format!("Host-{}", problem.objectid);
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
