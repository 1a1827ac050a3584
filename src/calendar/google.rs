use super::auth::ServiceAccountKey;
use super::{CalendarError, CalendarEvent, CalendarService, EventReceipt, RemoteEvent};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use log::{debug, info};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::path::Path;
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Google Calendar v3 client bound to a single calendar
pub struct GoogleCalendarClient {
    client: Client,
    calendar_id: String,
    access_token: SecretString,
}

impl GoogleCalendarClient {
    /// Authenticate with a service account key file.
    pub async fn connect(credentials_path: &Path, calendar_id: &str) -> Result<Self, CalendarError> {
        let key = ServiceAccountKey::from_file(credentials_path)?;
        let client = Client::new();
        let access_token = key.fetch_access_token(&client).await?;
        info!("Authenticated with Google Calendar as {}", key.client_email);

        Ok(Self { client, calendar_id: calendar_id.to_string(), access_token })
    }

    fn events_url(&self) -> Result<Url, CalendarError> {
        events_url(&self.calendar_id)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

fn events_url(calendar_id: &str) -> Result<Url, CalendarError> {
    let mut url = Url::parse(API_BASE).map_err(|e| CalendarError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| CalendarError::InvalidUrl(API_BASE.to_string()))?
        .pop_if_empty()
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

async fn check_status(response: Response) -> Result<Response, CalendarError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_else(|_| "Could not read error response".to_string());
    Err(CalendarError::Api { status, body })
}

fn parse_receipt(body: &Value) -> EventReceipt {
    EventReceipt {
        id: body.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
        html_link: body.get("htmlLink").and_then(Value::as_str).map(str::to_string),
    }
}

fn parse_event_list(body: &Value) -> Vec<RemoteEvent> {
    body.get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|event| {
                    let id = event.get("id").and_then(Value::as_str)?;
                    Some(RemoteEvent {
                        id: id.to_string(),
                        summary: event.get("summary").and_then(Value::as_str).map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn create_event(&self, event: &CalendarEvent) -> Result<EventReceipt, CalendarError> {
        let body = event.to_google_event();
        debug!("Creating event: {}", body);

        let response = self
            .client
            .post(self.events_url()?)
            .header("Authorization", self.bearer())
            .json(&body)
            .send()
            .await?;
        let created: Value = check_status(response).await?.json().await?;

        let receipt = parse_receipt(&created);
        info!("Event created: {}", receipt.html_link.as_deref().unwrap_or(&receipt.id));
        Ok(receipt)
    }

    async fn list_events(
        &self,
        time_min: DateTime<Tz>,
        time_max: DateTime<Tz>,
    ) -> Result<Vec<RemoteEvent>, CalendarError> {
        let mut url = self.events_url()?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339())
            .append_pair("timeMax", &time_max.to_rfc3339())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        let response = self.client.get(url).header("Authorization", self.bearer()).send().await?;
        let listed: Value = check_status(response).await?.json().await?;
        Ok(parse_event_list(&listed))
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let mut url = self.events_url()?;
        url.path_segments_mut()
            .map_err(|_| CalendarError::InvalidUrl(API_BASE.to_string()))?
            .push(event_id);

        let response = self.client.delete(url).header("Authorization", self.bearer()).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
