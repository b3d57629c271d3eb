// ── Problem domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::severity::Severity;

/// A key/value tag attached to a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag: String,
    pub value: String,
}

/// An active problem reported by the monitoring server.
///
/// Flag fields (`severity`, `acknowledged`, `suppressed`,
/// `manual_close`) keep the server's numeric-as-string encoding; use
/// the predicate methods instead of comparing strings directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Event id, unique within one server's result set.
    pub eventid: String,
    /// Id of the trigger that raised this problem. Many problems may
    /// share one trigger.
    pub objectid: String,
    /// Occurrence time as epoch seconds, verbatim from the wire.
    pub clock: String,
    pub name: String,
    /// Severity code `"0"`–`"5"`.
    pub severity: String,
    pub acknowledged: String,
    pub suppressed: String,
    /// Whether an operator may force-close this problem. Joined in from
    /// trigger metadata.
    #[serde(default)]
    pub manual_close: String,
    /// Trigger description, joined in from trigger metadata.
    #[serde(default)]
    pub comments: String,
    /// Owning host, joined in from trigger metadata.
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Problem {
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged == "1"
    }

    /// In maintenance, in server terms: the problem is suppressed.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed == "1"
    }

    #[must_use]
    pub fn can_close(&self) -> bool {
        self.manual_close == "1"
    }

    #[must_use]
    pub fn severity_level(&self) -> Severity {
        Severity::from_code(&self.severity)
    }

    /// Occurrence time, or `None` when the wire clock is unparseable.
    #[must_use]
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.clock.parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Age of the problem at `now`, formatted with the single largest
    /// fitting unit: `"42s"`, `"5m"`, `"3h"`, `"2d"`. Empty when the
    /// clock is unparseable.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(start) = self.occurred_at() else {
            return String::new();
        };
        let secs = (now - start).num_seconds().max(0);
        match secs {
            s if s < 60 => format!("{s}s"),
            s if s < 3_600 => format!("{}m", s / 60),
            s if s < 86_400 => format!("{}h", s / 3_600),
            s => format!("{}d", s / 86_400),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
