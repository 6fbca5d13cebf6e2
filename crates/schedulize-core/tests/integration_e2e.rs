//! E2E tests for the Google Calendar provider and the scheduling pipeline.
//!
//! Tests run against a local mockito server, so no credentials or network
//! access are needed.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use mockito::{Matcher, Server};
use serde_json::json;

use schedulize_core::integrations::google::MAX_EVENT_PAGES;
use schedulize_core::scheduler::SchedulerConfig;
use schedulize_core::schedule::parse_hhmm;
use schedulize_core::{
    AccessToken, Assignment, AssignmentKind, BusyEvent, BusySource, CalendarError, EventDraft,
    EventSink, GoogleCalendar, Routine, ScheduleError, SchedulingPipeline,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

fn calendar(server: &Server) -> GoogleCalendar {
    GoogleCalendar::new(AccessToken::new("test-token"))
        .unwrap()
        .with_base_url(&server.url())
        .unwrap()
}

fn routine() -> Routine {
    Routine::new(
        parse_hhmm("wake", "08:00").unwrap(),
        parse_hhmm("sleep", "23:00").unwrap(),
        vec![],
    )
}

fn timed_item(id: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "id": id,
        "status": "confirmed",
        "start": {"dateTime": start},
        "end": {"dateTime": end}
    })
}

// ============================================================================
// Google Calendar E2E Tests
// ============================================================================

#[tokio::test]
async fn test_google_fetch_busy_sends_auth_and_window() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("timeMin".into(), "2026-03-10T06:30:00+00:00".into()),
            Matcher::UrlEncoded("timeMax".into(), "2026-03-12T06:30:00+00:00".into()),
            Matcher::UrlEncoded("singleEvents".into(), "true".into()),
            Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    timed_item("a", "2026-03-10T09:00:00Z", "2026-03-10T10:00:00Z"),
                    {"id": "b", "start": {"date": "2026-03-11"}, "end": {"date": "2026-03-12"}},
                    {"id": "c", "status": "cancelled"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let events = calendar(&server)
        .fetch_busy(at(10, 6, 30), at(12, 6, 30))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        events,
        vec![
            BusyEvent::Timed {
                start: at(10, 9, 0),
                end: at(10, 10, 0),
            },
            BusyEvent::AllDay {
                start_date: NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
            },
        ]
    );
}

#[tokio::test]
async fn test_google_fetch_busy_follows_page_tokens() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Regex("showDeleted=false$".into()))
        .with_status(200)
        .with_body(
            json!({
                "items": [timed_item("a", "2026-03-10T09:00:00Z", "2026-03-10T10:00:00Z")],
                "nextPageToken": "page-2"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
        .with_status(200)
        .with_body(
            json!({
                "items": [timed_item("b", "2026-03-11T09:00:00Z", "2026-03-11T10:00:00Z")]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let events = calendar(&server)
        .fetch_busy(at(10, 0, 0), at(12, 0, 0))
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_google_fetch_busy_stops_at_page_limit() {
    let mut server = Server::new_async().await;
    let endless = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "items": [timed_item("a", "2026-03-10T09:00:00Z", "2026-03-10T10:00:00Z")],
                "nextPageToken": "again"
            })
            .to_string(),
        )
        .expect(MAX_EVENT_PAGES)
        .create_async()
        .await;

    let err = calendar(&server)
        .fetch_busy(at(10, 0, 0), at(12, 0, 0))
        .await
        .unwrap_err();

    endless.assert_async().await;
    assert!(matches!(err, CalendarError::Malformed(_)));
}

#[tokio::test]
async fn test_google_fetch_busy_skips_malformed_items() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "items": [
                    {"id": "broken", "start": {"dateTime": "yesterday"}, "end": {"dateTime": "today"}},
                    timed_item("ok", "2026-03-10T09:00:00Z", "2026-03-10T10:00:00Z")
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let events = calendar(&server)
        .fetch_busy(at(10, 0, 0), at(11, 0, 0))
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_google_api_error_carries_status_and_message() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendars/team-calendar/events")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(json!({"error": {"code": 403, "message": "Rate Limit Exceeded"}}).to_string())
        .create_async()
        .await;

    let err = calendar(&server)
        .with_calendar_id("team-calendar")
        .fetch_busy(at(10, 0, 0), at(11, 0, 0))
        .await
        .unwrap_err();

    match err {
        CalendarError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Rate Limit Exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_google_insert_event_posts_block() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/calendars/primary/events")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({
            "summary": "Work on: Essay (homework)",
            "description": "Estimated time: 2 hours",
            "start": {"dateTime": "2026-03-10T09:00:00+00:00"},
            "end": {"dateTime": "2026-03-10T10:00:00+00:00"},
            "extendedProperties": {"private": {"schedulize_assignment_id": "hw-1"}}
        })))
        .with_status(200)
        .with_body(json!({"id": "created-1"}).to_string())
        .create_async()
        .await;

    let draft = EventDraft {
        title: "Work on: Essay (homework)".into(),
        description: "Estimated time: 2 hours".into(),
        start: at(10, 9, 0),
        end: at(10, 10, 0),
        assignment_id: "hw-1".into(),
    };
    calendar(&server).insert_event(&draft).await.unwrap();

    mock.assert_async().await;
}

// ============================================================================
// Pipeline E2E Tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_schedules_around_existing_event() {
    let mut server = Server::new_async().await;
    let fetch = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "items": [timed_item("class", "2026-03-10T08:00:00Z", "2026-03-10T09:00:00Z")]
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/primary/events")
        .with_status(200)
        .with_body("{}")
        .expect(2)
        .create_async()
        .await;

    let gcal = calendar(&server);
    let now = at(10, 6, 30);
    let assignment =
        Assignment::new("Report", AssignmentKind::Project, now + Duration::days(2), 120.0).unwrap();

    let outcome = SchedulingPipeline::new(SchedulerConfig::default())
        .schedule_assignment(&assignment, Some(&routine()), &gcal, &gcal, now)
        .await
        .unwrap();

    fetch.assert_async().await;
    insert.assert_async().await;

    // 08:00-09:00 is busy; with the 10 minute buffer the first free slot is 09:15.
    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.created[0].interval.start, at(10, 9, 15));
    assert_eq!(outcome.created[0].interval.end, at(10, 10, 15));
    assert_eq!(outcome.created[1].interval.start, at(11, 8, 0));
    assert_eq!(outcome.shortfall_minutes(), 0.0);
    assert_eq!(outcome.refreshed.len(), 1);
}

#[tokio::test]
async fn test_pipeline_reports_partial_persist_failure() {
    let mut server = Server::new_async().await;
    let fetch = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"items": []}).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/calendars/primary/events")
        .with_status(500)
        .with_body(json!({"error": {"code": 500, "message": "Backend Error"}}).to_string())
        .create_async()
        .await;

    let gcal = calendar(&server);
    let now = at(10, 6, 30);
    let assignment =
        Assignment::new("Report", AssignmentKind::Project, now + Duration::days(2), 120.0).unwrap();

    let err = SchedulingPipeline::new(SchedulerConfig::default())
        .schedule_assignment(&assignment, Some(&routine()), &gcal, &gcal, now)
        .await
        .unwrap_err();

    // No refresh after a failed insert.
    fetch.assert_async().await;
    match err {
        ScheduleError::Persist {
            source,
            created,
            failed,
            not_attempted,
            ..
        } => {
            assert!(matches!(source, CalendarError::Api { status: 500, .. }));
            assert!(created.is_empty());
            assert_eq!(failed.interval.start, at(10, 8, 0));
            assert_eq!(not_attempted.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_pipeline_fetch_failure_persists_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(json!({"error": {"code": 401, "message": "Invalid Credentials"}}).to_string())
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/primary/events")
        .expect(0)
        .create_async()
        .await;

    let gcal = calendar(&server);
    let now = at(10, 6, 30);
    let assignment =
        Assignment::new("Quiz", AssignmentKind::Test, now + Duration::days(1), 60.0).unwrap();

    let err = SchedulingPipeline::new(SchedulerConfig::default())
        .schedule_assignment(&assignment, Some(&routine()), &gcal, &gcal, now)
        .await
        .unwrap_err();

    insert.assert_async().await;
    assert!(matches!(
        err,
        ScheduleError::Fetch {
            source: CalendarError::Api { status: 401, .. }
        }
    ));
    assert!(err.created().is_empty());
}
