//! Timestamp formats used inside documents, plus the JSON result envelope.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// `## CREATED` and learning-entry timestamps: `2024-01-01 10:00:00`.
pub const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Checkpoint timestamps: `2024-01-01T10:00:00Z`.
pub const CHECKPOINT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn parse_entry_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, ENTRY_TIMESTAMP_FORMAT)
}

pub fn checkpoint_timestamp(at: DateTime<Utc>) -> String {
    at.format(CHECKPOINT_TIMESTAMP_FORMAT).to_string()
}

pub fn now_checkpoint_timestamp() -> String {
    checkpoint_timestamp(Utc::now())
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// Standard command response envelope for `--format json`.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "envelope_version": "1.0.0",
        "ts": now_checkpoint_timestamp(),
        "event_id": new_event_id(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}
