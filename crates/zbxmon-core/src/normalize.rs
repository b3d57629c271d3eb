// ── Wire-to-domain record decoding ──
//
// Bridges untyped JSON-RPC result records into canonical
// `zbxmon_core::model` types. Decoding is lenient: every field read
// falls back to a documented default, and a record that cannot yield a
// minimally usable value is skipped, never fatal to the batch.

use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{Problem, Tag, TriggerMeta};

/// Outcome of decoding one wire record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Ok(T),
    /// Record dropped; the rest of the batch continues.
    Skip,
}

impl<T> Decoded<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Skip => None,
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// String field with an empty-string default. Wrong-typed values count
/// as absent.
fn text_field(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Numeric-as-string flag field with a `"0"` default.
fn flag_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key).and_then(Value::as_str) {
        Some(value) => value.to_owned(),
        None => "0".to_owned(),
    }
}

// ── Problems ───────────────────────────────────────────────────────

/// Decode one `problem.get` result record.
///
/// Trigger-derived fields (`host_name`, and usually `manual_close` and
/// `comments`) start at their defaults here; the repository joins them
/// in from trigger metadata afterwards.
pub fn decode_problem(raw: &Value) -> Decoded<Problem> {
    let Some(record) = raw.as_object() else {
        debug!("skipping non-object problem record");
        return Decoded::Skip;
    };
    Decoded::Ok(Problem {
        eventid: text_field(record, "eventid"),
        objectid: text_field(record, "objectid"),
        clock: text_field(record, "clock"),
        name: text_field(record, "name"),
        severity: flag_field(record, "severity"),
        acknowledged: flag_field(record, "acknowledged"),
        suppressed: flag_field(record, "suppressed"),
        manual_close: flag_field(record, "manual_close"),
        comments: text_field(record, "comments"),
        host_name: String::new(),
        tags: decode_tags(record.get("tags")),
    })
}

/// Decode a problem's tag array. A missing or malformed array is no
/// tags; individual malformed entries are dropped.
pub fn decode_tags(raw: Option<&Value>) -> Vec<Tag> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let record = entry.as_object()?;
            Some(Tag {
                tag: text_field(record, "tag"),
                value: text_field(record, "value"),
            })
        })
        .collect()
}

// ── Triggers ───────────────────────────────────────────────────────

/// Decode one `trigger.get` result record into its join key and
/// metadata.
///
/// Records without a usable `triggerid` are skipped: an empty join key
/// could never match a problem's `objectid`.
pub fn decode_trigger(raw: &Value) -> Decoded<(String, TriggerMeta)> {
    let Some(record) = raw.as_object() else {
        debug!("skipping non-object trigger record");
        return Decoded::Skip;
    };
    let triggerid = text_field(record, "triggerid");
    if triggerid.is_empty() {
        debug!("skipping trigger record without triggerid");
        return Decoded::Skip;
    }

    let host = record
        .get("hosts")
        .and_then(Value::as_array)
        .and_then(|hosts| hosts.first())
        .and_then(Value::as_object)
        .and_then(|entry| entry.get("host"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    Decoded::Ok((
        triggerid,
        TriggerMeta {
            host,
            manual_close: flag_field(record, "manual_close"),
            comments: text_field(record, "comments"),
        },
    ))
}

// ── Tests ───────────────────────────────────────────────────────────
