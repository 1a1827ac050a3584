use super::CalendarError;
use crate::extract::ActionItem;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde_json::{json, Map, Value};

const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Start and end of a timed event. They only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// An event ready to be sent to a calendar. `window` is `None` for untimed events.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub window: Option<EventWindow>,
}

impl CalendarEvent {
    /// Google Calendar `events.insert` body.
    ///
    /// `start`/`end` are left out entirely for untimed events; the API rejects
    /// one without the other and rejects explicit nulls.
    pub fn to_google_event(&self) -> Value {
        let mut body = Map::new();
        body.insert("summary".to_string(), Value::String(self.summary.clone()));

        if let Some(window) = &self.window {
            body.insert("start".to_string(), google_date_time(&window.start));
            body.insert("end".to_string(), google_date_time(&window.end));
        }

        Value::Object(body)
    }
}

fn google_date_time(at: &DateTime<Tz>) -> Value {
    json!({
        "dateTime": at.format(LOCAL_DATETIME_FORMAT).to_string(),
        "timeZone": at.timezone().name()
    })
}

/// Anchor an action item's times to `reference_date` in `timezone`.
///
/// A missing end time becomes start + 1 hour.
pub fn to_calendar_event(
    item: &ActionItem,
    reference_date: NaiveDate,
    timezone: Tz,
) -> Result<CalendarEvent, CalendarError> {
    to_calendar_event_with_duration(item, reference_date, timezone, Duration::hours(1))
}

/// [`to_calendar_event`] with an explicit fallback duration.
pub fn to_calendar_event_with_duration(
    item: &ActionItem,
    reference_date: NaiveDate,
    timezone: Tz,
    default_duration: Duration,
) -> Result<CalendarEvent, CalendarError> {
    let Some(start_time) = item.start_time.as_deref() else {
        return Ok(CalendarEvent { summary: item.summary.clone(), window: None });
    };

    let start = localize(reference_date.and_time(parse_hhmm(start_time)?), timezone)?;
    let end = match item.end_time.as_deref() {
        Some(end_time) => localize(reference_date.and_time(parse_hhmm(end_time)?), timezone)?,
        None => start + default_duration,
    };

    Ok(CalendarEvent { summary: item.summary.clone(), window: Some(EventWindow { start, end }) })
}

/// Local midnight of `date` up to local midnight of the following day.
pub fn day_bounds(date: NaiveDate, timezone: Tz) -> Result<(DateTime<Tz>, DateTime<Tz>), CalendarError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| CalendarError::InvalidDateTime(format!("No day after {}", date)))?;
    let start = localize(date.and_time(NaiveTime::default()), timezone)?;
    let end = localize(next.and_time(NaiveTime::default()), timezone)?;
    Ok((start, end))
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| CalendarError::InvalidDateTime(format!("Expected HH:MM, got '{}'", value)))
}

fn localize(naive: NaiveDateTime, timezone: Tz) -> Result<DateTime<Tz>, CalendarError> {
    // Ambiguous times (DST fall back) resolve to the earlier instant
    timezone.from_local_datetime(&naive).earliest().ok_or_else(|| {
        CalendarError::InvalidDateTime(format!("{} does not exist in {}", naive, timezone.name()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;
    use pretty_assertions::assert_eq;

    fn item(start: Option<&str>, end: Option<&str>) -> ActionItem {
        ActionItem {
            summary: "Dentist".to_string(),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_untimed_event_omits_start_and_end() {
        let event = to_calendar_event(&item(None, Some("10:00")), date(), Los_Angeles).unwrap();
        assert_eq!(event.window, None);

        let body = event.to_google_event();
        let object = body.as_object().unwrap();
        assert!(!object.contains_key("start"));
        assert!(!object.contains_key("end"));
        assert_eq!(body["summary"], "Dentist");
    }

    #[test]
    fn test_timed_event_payload() {
        let event = to_calendar_event(&item(Some("15:30"), Some("16:00")), date(), Los_Angeles).unwrap();
        assert_eq!(
            event.to_google_event(),
            json!({
                "summary": "Dentist",
                "start": {"dateTime": "2024-05-01T15:30:00", "timeZone": "America/Los_Angeles"},
                "end": {"dateTime": "2024-05-01T16:00:00", "timeZone": "America/Los_Angeles"}
            })
        );
    }

    #[test]
    fn test_missing_end_defaults_to_one_hour() {
        let event = to_calendar_event(&item(Some("23:30"), None), date(), Los_Angeles).unwrap();
        let window = event.window.unwrap();
        assert_eq!(window.end - window.start, Duration::hours(1));
        assert_eq!(window.end.format("%Y-%m-%d %H:%M").to_string(), "2024-05-02 00:30");
    }

    #[test]
    fn test_malformed_time_is_rejected() {
        let result = to_calendar_event(&item(Some("3 PM"), None), date(), Los_Angeles);
        assert!(matches!(result, Err(CalendarError::InvalidDateTime(_))));
    }

    #[test]
    fn test_nonexistent_local_time_is_rejected() {
        // Clocks jump from 02:00 to 03:00 on 2024-03-10 in Los Angeles
        let spring_forward = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let result = to_calendar_event(&item(Some("02:30"), None), spring_forward, Los_Angeles);
        assert!(matches!(result, Err(CalendarError::InvalidDateTime(_))));
    }

    #[test]
    fn test_ambiguous_local_time_takes_earlier_instant() {
        // 01:00 to 02:00 happens twice on 2024-11-03 in Los Angeles
        let fall_back = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        let event = to_calendar_event(&item(Some("01:30"), Some("02:30")), fall_back, Los_Angeles).unwrap();
        let window = event.window.unwrap();

        assert_eq!(window.start.to_rfc3339(), "2024-11-03T01:30:00-07:00");
        assert_eq!(window.end.to_rfc3339(), "2024-11-03T02:30:00-08:00");
        assert_eq!(window.end - window.start, Duration::hours(2));
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(date(), Los_Angeles).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-01T00:00:00-07:00");
        assert_eq!(end.to_rfc3339(), "2024-05-02T00:00:00-07:00");
    }
}
