use serde_json::{Map, Value};

use super::responses_types::Response;

/// Concatenated text output of a response.
///
/// Uses `output_text` when the service precomputed it, otherwise walks
/// `message` items and joins their `output_text` parts in order.
#[must_use]
pub fn extract_text(response: &Response) -> String {
    if let Some(text) = response.output_text.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }

    response
        .output
        .iter()
        .filter(|item| item.is_message())
        .flat_map(|item| item.content.iter().flatten())
        .filter(|content| content.is_output_text())
        .filter_map(|content| content.text.as_deref())
        .collect()
}

/// Serialize a response into a plain JSON object, with usage aliased to the
/// `prompt_tokens` / `completion_tokens` names.
#[must_use]
pub fn to_plain_mapping(response: &Response) -> Map<String, Value> {
    let mut map = match serde_json::to_value(response) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    normalize_usage(&mut map);
    map
}

/// Add conventional usage names derived from the provider's ones.
/// Existing conventional values are never overwritten.
pub fn normalize_usage(map: &mut Map<String, Value>) {
    let Some(Value::Object(usage)) = map.get_mut("usage") else {
        return;
    };

    for (conventional, provider) in [
        ("prompt_tokens", "input_tokens"),
        ("completion_tokens", "output_tokens"),
    ] {
        if usage.contains_key(conventional) {
            continue;
        }
        if let Some(value) = usage.get(provider).cloned() {
            usage.insert(conventional.to_string(), value);
        }
    }
}
