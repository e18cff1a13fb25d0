use serde_json::Value;

use super::StructuringError;
use crate::pipeline::extraction::{clean_tasks, DateNormalizer, Task};

/// Parse raw model output into cleaned tasks.
///
/// Takes the first `[` to the last `]` as the array literal. Non-object
/// items are skipped; empty strings and `false` count as missing fields.
/// Deadlines are normalized like the rule-based tier does.
pub fn parse_model_tasks(
    raw: &str,
    normalizer: &DateNormalizer,
) -> Result<Vec<Task>, StructuringError> {
    let payload = extract_json_array(raw).ok_or(StructuringError::NoJsonArray)?;
    let items: Vec<Value> =
        serde_json::from_str(payload).map_err(|e| StructuringError::JsonParsing(e.to_string()))?;

    let tasks = items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let text = field(item, "task").or_else(|| field(item, "text"))?;
            Some(
                Task::new(text)
                    .with_time(field(item, "time"))
                    .with_category(field(item, "category"))
                    .with_deadline(field(item, "deadline").map(|d| normalizer.normalize(&d))),
            )
        })
        .collect();

    Ok(clean_tasks(tasks))
}

/// Slice from the first `[` to the last `]`, if both exist in order.
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

/// A field as trimmed text, or None when missing or falsy.
fn field(item: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let text = match item.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
