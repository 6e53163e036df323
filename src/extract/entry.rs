//! Entry normalization and alias resolution.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::JudgeError;
use crate::models::ScheduledBlock;
use crate::time::parse_instant;

/// List-bearing keys of a container object, in preference order.
pub const CONTAINER_KEYS: [&str; 4] = ["schedule", "blocks", "events", "focus_blocks"];

const TITLE_KEYS: [&str; 3] = ["title", "name", "summary"];
const START_KEYS: [&str; 2] = ["start", "start_time"];
const END_KEYS: [&str; 2] = ["end", "end_time"];

/// Title used when an entry names none.
pub const DEFAULT_TITLE: &str = "Focus Block";

/// Converts a parsed payload into blocks.
///
/// Arrays are used as-is. An object is unwrapped through
/// [`CONTAINER_KEYS`] when one of them holds an array, otherwise it is
/// a single entry. Anything else yields no blocks.
pub fn blocks_from_value(value: &Value) -> Vec<ScheduledBlock> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => CONTAINER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(|items| items.iter().collect())
            .unwrap_or_else(|| vec![value]),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| match block_from_entry(entry) {
            Ok(block) => Some(block),
            Err(e) => {
                debug!(error = %e, "dropping entry");
                None
            }
        })
        .collect()
}

/// Resolves one entry into a block.
///
/// For each field the first alias present wins, even if its value is
/// empty. Non-string titles are stringified.
///
/// # Errors
/// [`JudgeError::MissingField`] if the entry is not an object or has no
/// usable start/end, [`JudgeError::InvalidInstant`] if one does not
/// parse.
pub fn block_from_entry(entry: &Value) -> Result<ScheduledBlock, JudgeError> {
    let map = entry
        .as_object()
        .ok_or_else(|| JudgeError::MissingField("entry is not an object".to_string()))?;
    let first = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k));

    let title = match first(&TITLE_KEYS) {
        None | Some(Value::Null) => DEFAULT_TITLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let start = instant_field(first(&START_KEYS), "start")?;
    let end = instant_field(first(&END_KEYS), "end")?;

    Ok(ScheduledBlock::new(title, start, end))
}

fn instant_field(value: Option<&Value>, field: &str) -> Result<DateTime<Utc>, JudgeError> {
    let text = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(JudgeError::MissingField(field.to_string())),
    };
    parse_instant(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_precedence() {
        let block = block_from_entry(&json!({
            "summary": "ignored",
            "name": "Named",
            "start": "2025-01-20T09:00:00Z",
            "start_time": "2025-01-20T11:00:00Z",
            "end_time": "2025-01-20T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(block.title, "Named");
        assert_eq!(block.start.to_rfc3339(), "2025-01-20T09:00:00+00:00");
        assert_eq!(block.end.to_rfc3339(), "2025-01-20T10:00:00+00:00");
    }

    #[test]
    fn test_first_alias_wins_even_if_empty() {
        let entry = json!({
            "start": "",
            "start_time": "2025-01-20T09:00:00Z",
            "end": "2025-01-20T10:00:00Z"
        });
        assert!(block_from_entry(&entry).is_err());
    }

    #[test]
    fn test_title_stringified() {
        let block = block_from_entry(&json!({
            "title": 7,
            "start": "2025-01-20T09:00:00Z",
            "end": "2025-01-20T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(block.title, "7");
    }

    #[test]
    fn test_bad_entries_dropped_individually() {
        let blocks = blocks_from_value(&json!([
            {"start": "2025-01-20T09:00:00Z", "end": "2025-01-20T10:00:00Z"},
            {"start": "2025-01-20T09:00:00Z"},
            {"start": "Monday 9am", "end": "Monday 10am"},
            "just text",
            {"start": "2025-01-21T09:00:00Z", "end": "2025-01-21T10:00:00Z"}
        ]));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_container_preference() {
        let value = json!({
            "events": [{"start": "2025-01-21T09:00:00Z", "end": "2025-01-21T10:00:00Z"}],
            "schedule": [
                {"start": "2025-01-20T09:00:00Z", "end": "2025-01-20T10:00:00Z"},
                {"start": "2025-01-22T09:00:00Z", "end": "2025-01-22T10:00:00Z"}
            ]
        });
        assert_eq!(blocks_from_value(&value).len(), 2);

        // Non-array container values are not unwrapped
        let value = json!({"blocks": "none", "start": "2025-01-20T09:00:00Z", "end": "2025-01-20T10:00:00Z"});
        assert_eq!(blocks_from_value(&value).len(), 1);
    }

    #[test]
    fn test_degenerate_interval_kept() {
        let block = block_from_entry(&json!({
            "start": "2025-01-20T10:00:00Z",
            "end": "2025-01-20T09:00:00Z"
        }))
        .unwrap();
        assert!(block.duration_minutes() < 0.0);
    }
}
