//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | `?upcoming=true`, `?category=`, `?limit=` |
//! | `POST` | `/events` | Body: [`CreateBody`]; organizer is the caller; returns 201 |
//! | `GET`  | `/events/{id}` | 404 if not found |
//! | `POST` | `/events/{id}/attend` | Body: `{"status":"attending"\|"maybe"\|"not_attending"}`, may be omitted |
//! | `GET`  | `/events/{id}/attendance` | The caller's RSVP, 404 if none |
//! | `GET`  | `/events/{id}/attendees` | Every RSVP, oldest first |

use std::sync::Arc;

use agora_core::{
  event::{Event, EventQuery, NewEvent},
  ledger::{AttendanceStatus, EventAttendee},
  store::CivicStore,
};
use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Takes precedence over `category`.
  #[serde(default)]
  pub upcoming: bool,
  pub category: Option<String>,
  pub limit:    Option<usize>,
}

/// `GET /events[?upcoming=true][&category=...][&limit=<n>]`
pub async fn list<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
  let query = EventQuery {
    upcoming: params.upcoming,
    category: params.category,
    limit:    params.limit,
  };
  let events = store.list_events(query).await.map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  pub description: Option<String>,
  pub location:    Option<String>,
  #[serde(alias = "startTime")]
  pub start_time:  DateTime<Utc>,
  #[serde(alias = "endTime")]
  pub end_time:    Option<DateTime<Utc>>,
  pub category:    Option<String>,
  #[serde(default, alias = "isVirtual")]
  pub is_virtual:  bool,
  #[serde(alias = "meetingUrl")]
  pub meeting_url: Option<String>,
}

/// `POST /events`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewEvent {
    title:        body.title,
    description:  body.description,
    location:     body.location,
    start_time:   body.start_time,
    end_time:     body.end_time,
    organizer_id: caller.user_id,
    category:     body.category,
    is_virtual:   body.is_virtual,
    meeting_url:  body.meeting_url,
  };
  let event = store.create_event(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/{id}`
pub async fn get_one<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
  let event = store
    .get_event(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(event))
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttendBody {
  /// Defaults to `attending`.
  pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendResponse {
  pub message: &'static str,
  pub event:   Event,
}

/// `POST /events/{id}/attend`
pub async fn attend<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  body: Option<Json<AttendBody>>,
) -> Result<Json<AttendResponse>, ApiError> {
  let raw = body.and_then(|Json(body)| body.status);
  let status = match raw.as_deref() {
    Some(raw) => AttendanceStatus::parse(raw)?,
    None => AttendanceStatus::default(),
  };
  let event = store
    .set_attendance(id, caller.user_id, status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(AttendResponse { message: "Attendance updated", event }))
}

/// `GET /events/{id}/attendance`
pub async fn my_attendance<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<Json<EventAttendee>, ApiError> {
  let row = store
    .get_attendance(id, caller.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no attendance for event {id}")))?;
  Ok(Json(row))
}

/// `GET /events/{id}/attendees`
pub async fn attendees<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<EventAttendee>>, ApiError> {
  let rows = store.list_attendees(id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}
