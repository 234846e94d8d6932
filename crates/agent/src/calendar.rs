//! Free/busy reconciliation against a calendar HTTP service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use lexbook_core::availability::{candidate_starts, reconcile_with_busy};
use lexbook_core::{AvailabilityError, AvailabilityProvider, AvailabilitySlot, BusyInterval, Lawyer};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct BusyResponse {
    #[serde(default)]
    busy: Vec<BusyInterval>,
}

pub struct CalendarAvailability {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarAvailability {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    async fn busy_intervals(
        &self,
        lawyer: &Lawyer,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BusyInterval>, AvailabilityError> {
        let lawyer_id = lawyer.id.as_str();
        let url = format!("{}/calendars/{lawyer_id}/busy", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("from", from.to_string()), ("to", to.to_string())])
            .send()
            .await
            .map_err(|error| AvailabilityError::Transport {
                lawyer_id: lawyer_id.to_owned(),
                message: error.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(AvailabilityError::Status {
                lawyer_id: lawyer_id.to_owned(),
                status: response.status().as_u16(),
            });
        }

        let body = response.json::<BusyResponse>().await.map_err(|error| {
            AvailabilityError::Decode { lawyer_id: lawyer_id.to_owned(), message: error.to_string() }
        })?;
        Ok(body.busy)
    }
}

#[async_trait]
impl AvailabilityProvider for CalendarAvailability {
    async fn slots_for(
        &self,
        lawyer: &Lawyer,
        dates: &[NaiveDate],
        now: NaiveDateTime,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        let candidates = candidate_starts(dates, now);
        let (Some(from), Some(to)) = (dates.iter().min(), dates.iter().max()) else {
            return Ok(Vec::new());
        };
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let busy = self.busy_intervals(lawyer, *from, *to).await?;
        debug!(
            event_name = "availability.calendar.busy_loaded",
            lawyer_id = %lawyer.id,
            busy_intervals = busy.len(),
            "calendar busy intervals loaded"
        );
        Ok(reconcile_with_busy(&candidates, &busy))
    }

    fn name(&self) -> &'static str {
        "calendar"
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::{NaiveDate, NaiveDateTime, Timelike};
    use lexbook_core::{AvailabilityError, AvailabilityProvider, Lawyer, LawyerId, PracticeArea};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use super::CalendarAvailability;

    async fn busy(
        Path(lawyer_id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        if lawyer_id == "lawyer_broken" {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
        }
        assert_eq!(query.get("from").map(String::as_str), Some("2026-10-19"));
        assert_eq!(query.get("to").map(String::as_str), Some("2026-10-19"));
        (
            StatusCode::OK,
            Json(json!({
                "busy": [
                    {"start": "2026-10-19T09:00:00", "end": "2026-10-19T11:00:00"},
                    {"start": "2026-10-19T15:30:00", "end": "2026-10-19T17:00:00"}
                ]
            })),
        )
    }

    async fn spawn_calendar() -> String {
        let app = Router::new().route("/calendars/{lawyer_id}/busy", get(busy));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{address}/")
    }

    fn lawyer(id: &str) -> Lawyer {
        Lawyer {
            id: LawyerId(id.to_owned()),
            name: "Michael Chen".to_owned(),
            practice_areas: vec![PracticeArea::Litigation],
            hourly_rate: Decimal::new(400, 0),
            email: "michael@leaptra.com".to_owned(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("date")
    }

    fn saturday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17).and_then(|date| date.and_hms_opt(8, 0, 0)).expect("now")
    }

    #[tokio::test]
    async fn busy_blocks_remove_and_bound_slots() {
        let calendar = CalendarAvailability::new(&spawn_calendar().await, 5).expect("client");

        let slots = calendar
            .slots_for(&lawyer("lawyer_2"), &[monday()], saturday_morning())
            .await
            .expect("slots");

        let summary = slots
            .iter()
            .map(|slot| (slot.starts_at.hour(), slot.duration_ceiling_minutes))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![(11, 120), (14, 90), (15, 30)]);
        assert_eq!(calendar.name(), "calendar");
    }

    #[tokio::test]
    async fn server_error_is_reported_per_lawyer() {
        let calendar = CalendarAvailability::new(&spawn_calendar().await, 5).expect("client");

        let error = calendar
            .slots_for(&lawyer("lawyer_broken"), &[monday()], saturday_morning())
            .await
            .expect_err("calendar failure");

        assert!(matches!(
            error,
            AvailabilityError::Status { ref lawyer_id, status: 500 } if lawyer_id == "lawyer_broken"
        ));
    }

    #[tokio::test]
    async fn past_dates_skip_the_request() {
        let calendar = CalendarAvailability::new("http://127.0.0.1:9", 1).expect("client");
        let past = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");

        let slots = calendar
            .slots_for(&lawyer("lawyer_2"), &[past], saturday_morning())
            .await
            .expect("nothing to reconcile");

        assert!(slots.is_empty());
    }
}
