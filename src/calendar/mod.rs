mod auth;
pub mod event;
mod google;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use log::info;

pub use auth::ServiceAccountKey;
pub use event::{
    day_bounds, to_calendar_event, to_calendar_event_with_duration, CalendarEvent, EventWindow,
};
pub use google::GoogleCalendarClient;

/// Custom error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
    #[error("Failed to load credentials: {0}")]
    Credentials(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Invalid calendar URL: {0}")]
    InvalidUrl(String),
    #[error("Calendar API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// What the calendar hands back after creating an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReceipt {
    pub id: String,
    pub html_link: Option<String>,
}

/// An event that already exists on the calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: Option<String>,
}

/// Remote calendar operations
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(&self, event: &CalendarEvent) -> Result<EventReceipt, CalendarError>;

    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<RemoteEvent>, CalendarError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;

    /// Delete every event that falls on `date` in `timezone`. Returns how many were removed.
    async fn delete_all_events_for_day(
        &self,
        date: NaiveDate,
        timezone: Tz,
    ) -> Result<usize, CalendarError> {
        let (start, end) = day_bounds(date, timezone)?;
        let events = self.list_events(start, end).await?;

        if events.is_empty() {
            info!("No events found for {}", date);
            return Ok(0);
        }

        for event in &events {
            self.delete_event(&event.id).await?;
            info!("Deleted event: {}", event.summary.as_deref().unwrap_or(&event.id));
        }

        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCalendar {
        existing: Vec<RemoteEvent>,
        listed_range: Mutex<Option<(String, String)>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CalendarService for RecordingCalendar {
        async fn create_event(&self, _event: &CalendarEvent) -> Result<EventReceipt, CalendarError> {
            unreachable!("not used")
        }

        async fn list_events(
            &self,
            time_min: DateTime<Tz>,
            time_max: DateTime<Tz>,
        ) -> Result<Vec<RemoteEvent>, CalendarError> {
            *self.listed_range.lock().unwrap() = Some((time_min.to_rfc3339(), time_max.to_rfc3339()));
            Ok(self.existing.clone())
        }

        async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
            self.deleted.lock().unwrap().push(event_id.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delete_all_events_for_day() {
        let calendar = RecordingCalendar {
            existing: vec![
                RemoteEvent { id: "a1".to_string(), summary: Some("Standup".to_string()) },
                RemoteEvent { id: "b2".to_string(), summary: None },
            ],
            ..Default::default()
        };

        let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        let removed = calendar.delete_all_events_for_day(date, Los_Angeles).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(*calendar.deleted.lock().unwrap(), vec!["a1".to_string(), "b2".to_string()]);
        // DST ends on this date, so the day spans two offsets
        assert_eq!(
            *calendar.listed_range.lock().unwrap(),
            Some(("2024-11-03T00:00:00-07:00".to_string(), "2024-11-04T00:00:00-08:00".to_string()))
        );
    }

    #[tokio::test]
    async fn test_delete_all_events_for_empty_day() {
        let calendar = RecordingCalendar::default();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(calendar.delete_all_events_for_day(date, Los_Angeles).await.unwrap(), 0);
        assert!(calendar.deleted.lock().unwrap().is_empty());
    }
}
