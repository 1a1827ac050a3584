//! Pull the `action_items` array out of a raw model completion.
//!
//! Models are told to answer with bare JSON but routinely wrap it in prose or
//! markdown fences. The greedy `{ ... }` slice handles the common case; when
//! that slice is not valid JSON we scan forward with a streaming deserializer
//! and keep the first object that carries `action_items`.

use super::RawActionItem;
use log::{debug, warn};
use serde_json::Value;

const ACTION_ITEMS_KEY: &str = "action_items";

/// Parse a completion into raw action items. Never fails: anything that is
/// not recognisable model output yields an empty vector.
pub fn parse_response(response: &str) -> Vec<RawActionItem> {
    let Some(document) = find_json_object(response) else {
        warn!("No JSON object found in model response");
        return Vec::new();
    };

    let Some(items) = document.get(ACTION_ITEMS_KEY) else {
        debug!("Model response has no '{}' key", ACTION_ITEMS_KEY);
        return Vec::new();
    };

    let Some(items) = items.as_array() else {
        warn!("'{}' in model response is not an array", ACTION_ITEMS_KEY);
        return Vec::new();
    };

    items.iter().filter_map(to_raw_item).collect()
}

/// Map one array entry field by field. A field of the wrong JSON type is
/// treated as absent so the rest of the item survives.
fn to_raw_item(item: &Value) -> Option<RawActionItem> {
    let Some(fields) = item.as_object() else {
        warn!("Skipping action item that is not an object: {}", item);
        return None;
    };

    let text = |key: &str| match fields.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            debug!("Ignoring non-string '{}' in action item: {}", key, other);
            None
        }
    };

    Some(RawActionItem {
        summary: text("summary").unwrap_or_default(),
        start_time: text("start_time"),
        end_time: text("end_time"),
    })
}

fn find_json_object(response: &str) -> Option<Value> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }

    let greedy = &response[start..=end];
    match serde_json::from_str::<Value>(greedy) {
        Ok(value) if value.is_object() => return Some(value),
        Ok(_) => {}
        Err(e) => debug!("Greedy JSON candidate did not parse: {}", e),
    }

    scan_for_object(response)
}

/// Try every `{` in turn and return the first complete object with an
/// `action_items` key.
fn scan_for_object(response: &str) -> Option<Value> {
    for (offset, _) in response.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&response[offset..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            if value.get(ACTION_ITEMS_KEY).is_some() {
                return Some(value);
            }
        }
    }

    warn!("Failed to decode JSON in model response");
    None
}
