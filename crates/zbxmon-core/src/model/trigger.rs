// ── Trigger metadata ──

/// Join-only metadata about the trigger that raised a problem.
///
/// Fetched fresh on every sync and folded into [`super::Problem`]
/// records; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMeta {
    /// Name of the first host attached to the trigger. `None` when the
    /// trigger record carried no host entry at all.
    pub host: Option<String>,
    /// Whether the trigger allows manual close, wire-encoded.
    pub manual_close: String,
    /// Trigger description text.
    pub comments: String,
}

impl Default for TriggerMeta {
    fn default() -> Self {
        Self {
            host: None,
            manual_close: "0".to_owned(),
            comments: String::new(),
        }
    }
}
