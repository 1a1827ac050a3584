use super::time::{add_minutes, format_time};
use super::{ActionItem, RawActionItem};
use log::debug;

/// Minutes used for an item whose end cannot be inferred from its successor.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Longest default duration accepted from configuration: one day.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Normalize extracted items with the default one-hour duration.
pub fn normalize(items: Vec<RawActionItem>) -> Vec<ActionItem> {
    normalize_with_duration(items, DEFAULT_DURATION_MINUTES)
}

/// Clean times, fill missing end times and drop items without a start.
///
/// An item without an end ends when the next item starts. When there is no
/// next item, or the next item has no start either, it lasts
/// `default_minutes`. Relative order is preserved.
pub fn normalize_with_duration(items: Vec<RawActionItem>, default_minutes: i64) -> Vec<ActionItem> {
    let mut cleaned: Vec<ActionItem> = items
        .into_iter()
        .map(|item| ActionItem {
            start_time: item.start_time.as_deref().and_then(format_time),
            end_time: item.end_time.as_deref().and_then(format_time),
            summary: item.summary,
        })
        .collect();

    for i in 0..cleaned.len() {
        if cleaned[i].end_time.is_some() {
            continue;
        }
        let Some(start) = cleaned[i].start_time.clone() else {
            continue;
        };

        let next_start = cleaned.get(i + 1).and_then(|next| next.start_time.clone());
        cleaned[i].end_time = match next_start {
            Some(next_start) => Some(next_start),
            None => add_minutes(&start, default_minutes),
        };
    }

    cleaned
        .into_iter()
        .filter(|item| {
            if item.start_time.is_none() {
                debug!("Dropping untimed action item: {}", item.summary);
            }
            item.start_time.is_some()
        })
        .collect()
}
