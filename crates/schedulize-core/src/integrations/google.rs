//! Google Calendar provider.
//!
//! Reads busy events from and inserts work blocks into a Google Calendar
//! using the Calendar v3 REST API. The access token is passed in
//! explicitly; obtaining and refreshing it is the caller's business.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::traits::{BusySource, EventDraft, EventSink};
use crate::error::CalendarError;
use crate::interval::BusyEvent;

/// Default Calendar v3 endpoint.
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3/";

/// Upper bound on result pages followed by one busy fetch.
pub const MAX_EVENT_PAGES: usize = 25;

/// Bearer token for the Calendar API. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A single Google calendar, addressed by id.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    client: Client,
    base_url: Url,
    calendar_id: String,
    token: AccessToken,
}

impl GoogleCalendar {
    /// Primary calendar on the public endpoint.
    pub fn new(token: AccessToken) -> Result<Self, CalendarError> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(GOOGLE_CALENDAR_API)?,
            calendar_id: "primary".to_string(),
            token,
        })
    }

    /// Point at another endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CalendarError> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self) -> Result<Url, CalendarError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CalendarError::Malformed(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<Value, CalendarError> {
        let mut url = self.events_url()?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &time_min.to_rfc3339())
                .append_pair("timeMax", &time_max.to_rfc3339())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime")
                .append_pair("showDeleted", "false");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let resp = self
            .client
            .get(url)
            .bearer_auth(self.token.secret())
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }
}

#[async_trait]
impl BusySource for GoogleCalendar {
    async fn fetch_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.fetch_page(time_min, time_max, page_token.as_deref()).await?;
            pages += 1;
            let items = page["items"]
                .as_array()
                .ok_or_else(|| CalendarError::Malformed("missing items in response".into()))?;

            for item in items {
                match parse_event_item(item) {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => {}
                    Err(e) => warn!(id = item["id"].as_str().unwrap_or("?"), error = %e, "skipping calendar item"),
                }
            }

            match page["nextPageToken"].as_str() {
                Some(_) if pages >= MAX_EVENT_PAGES => {
                    return Err(CalendarError::Malformed(format!(
                        "still paging after {MAX_EVENT_PAGES} pages"
                    )));
                }
                Some(next) => page_token = Some(next.to_string()),
                None => break,
            }
        }

        debug!(calendar = %self.calendar_id, count = events.len(), "fetched busy events");
        Ok(events)
    }
}

#[async_trait]
impl EventSink for GoogleCalendar {
    async fn insert_event(&self, event: &EventDraft) -> Result<(), CalendarError> {
        let resp = self
            .client
            .post(self.events_url()?)
            .bearer_auth(self.token.secret())
            .json(&to_gcal_event(event))
            .send()
            .await?;
        check_status(resp).await?;
        debug!(start = %event.start, end = %event.end, "inserted calendar event");
        Ok(())
    }
}

async fn check_status(resp: Response) -> Result<Response, CalendarError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(CalendarError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Interpret one item of an events list.
///
/// Returns `Ok(None)` for cancelled events.
pub fn parse_event_item(item: &Value) -> Result<Option<BusyEvent>, CalendarError> {
    if item["status"].as_str() == Some("cancelled") {
        return Ok(None);
    }

    if let (Some(start), Some(end)) = (
        item["start"]["dateTime"].as_str(),
        item["end"]["dateTime"].as_str(),
    ) {
        return Ok(Some(BusyEvent::Timed {
            start: parse_timestamp(start)?,
            end: parse_timestamp(end)?,
        }));
    }

    let start_date = item["start"]["date"]
        .as_str()
        .ok_or_else(|| CalendarError::Malformed("missing start time".into()))?;
    let start_date = parse_date(start_date)?;
    let end_date = match item["end"]["date"].as_str() {
        Some(d) => parse_date(d)?,
        None => start_date,
    };
    Ok(Some(BusyEvent::AllDay {
        start_date,
        end_date,
    }))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, CalendarError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CalendarError::Malformed(format!("invalid timestamp '{s}': {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| CalendarError::Malformed(format!("invalid date '{s}': {e}")))
}

/// Convert an [`EventDraft`] to the Google Calendar event format.
pub fn to_gcal_event(event: &EventDraft) -> Value {
    json!({
        "summary": event.title,
        "description": event.description,
        "start": {"dateTime": event.start.to_rfc3339()},
        "end": {"dateTime": event.end.to_rfc3339()},
        "extendedProperties": {
            "private": {
                "schedulize_assignment_id": event.assignment_id,
            }
        }
    })
}
