//! Time-of-day normalization for model output.
//!
//! Language models write times the way people do ("3 PM", "3:30 pm",
//! "by 4 PM"). Everything downstream works on the canonical 24-hour `HH:MM`
//! form produced here.

use chrono::{Duration, NaiveTime};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// `H:MM AM/PM`
static TWELVE_HOUR_WITH_MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})\s*([ap])\.?m\.?$").unwrap());

/// `H AM/PM`
static TWELVE_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d{1,2})\s*([ap])\.?m\.?$").unwrap());

const CANONICAL_FORMAT: &str = "%H:%M";
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Convert a free-form time string into canonical `HH:MM`.
///
/// Returns `None` for empty input or anything that is not a recognisable
/// time of day. This never fails loudly: callers treat `None` as "no time".
pub fn format_time(raw: &str) -> Option<String> {
    parse_time(raw).map(|time| time.format(CANONICAL_FORMAT).to_string())
}

/// Same as [`format_time`] but keeps the parsed value.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = strip_by_prefix(trimmed);

    if let Some(time) = parse_twelve_hour(cleaned) {
        return Some(time);
    }

    // Already canonical, e.g. a value that went through this function before
    if let Ok(time) = NaiveTime::parse_from_str(cleaned, CANONICAL_FORMAT) {
        return Some(time);
    }

    debug!("Failed to parse time: {}", raw);
    None
}

/// Add `minutes` to a canonical `HH:MM` string, wrapping around midnight.
pub fn add_minutes(canonical: &str, minutes: i64) -> Option<String> {
    let time = NaiveTime::parse_from_str(canonical, CANONICAL_FORMAT).ok()?;
    // Only the offset within one day matters, which also keeps Duration in range
    let (shifted, _) = time.overflowing_add_signed(Duration::minutes(minutes.rem_euclid(MINUTES_PER_DAY)));
    Some(shifted.format(CANONICAL_FORMAT).to_string())
}

fn strip_by_prefix(input: &str) -> &str {
    match input.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("by ") => input[3..].trim_start(),
        _ => input,
    }
}

fn parse_twelve_hour(input: &str) -> Option<NaiveTime> {
    let (hour, minute, meridiem) = if let Some(caps) = TWELVE_HOUR_WITH_MINUTES.captures(input) {
        (caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?, caps[3].to_ascii_lowercase())
    } else if let Some(caps) = TWELVE_HOUR.captures(input) {
        (caps[1].parse::<u32>().ok()?, 0, caps[2].to_ascii_lowercase())
    } else {
        return None;
    };

    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour_24 = match (meridiem.as_str(), hour) {
        ("a", 12) => 0,
        ("p", h) if h < 12 => h + 12,
        (_, h) => h,
    };

    NaiveTime::from_hms_opt(hour_24, minute, 0)
}
