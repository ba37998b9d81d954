//! Civic events (town halls, cleanups, hearings).
//!
//! `attendee_count` mirrors the attendance ledger: it is the number of
//! [`EventAttendee`](crate::ledger::EventAttendee) rows whose status is
//! `attending`.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, error::require_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:       Uuid,
  pub title:          String,
  pub description:    Option<String>,
  pub location:       Option<String>,
  pub start_time:     DateTime<Utc>,
  pub end_time:       Option<DateTime<Utc>>,
  pub organizer_id:   String,
  pub category:       Option<String>,
  pub attendee_count: u32,
  pub is_virtual:     bool,
  pub meeting_url:    Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::create_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:        String,
  pub description:  Option<String>,
  pub location:     Option<String>,
  pub start_time:   DateTime<Utc>,
  pub end_time:     Option<DateTime<Utc>>,
  pub organizer_id: String,
  pub category:     Option<String>,
  pub is_virtual:   bool,
  pub meeting_url:  Option<String>,
}

impl NewEvent {
  pub fn new(
    organizer_id: impl Into<String>,
    title: impl Into<String>,
    start_time: DateTime<Utc>,
  ) -> Self {
    Self {
      title: title.into(),
      description: None,
      location: None,
      start_time,
      end_time: None,
      organizer_id: organizer_id.into(),
      category: None,
      is_virtual: false,
      meeting_url: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("event title", &self.title)?;
    require_text("organizer id", &self.organizer_id)?;
    if let Some(end) = self.end_time
      && end < self.start_time
    {
      return Err(Error::InvalidArgument(
        "event end_time precedes start_time".to_owned(),
      ));
    }
    Ok(())
  }

  /// Caller-supplied times are truncated to microseconds, the precision the
  /// stores keep.
  pub fn into_event(self, now: DateTime<Utc>) -> Event {
    Event {
      event_id:       Uuid::new_v4(),
      title:          self.title,
      description:    self.description,
      location:       self.location,
      start_time:     self.start_time.trunc_subsecs(6),
      end_time:       self.end_time.map(|t| t.trunc_subsecs(6)),
      organizer_id:   self.organizer_id,
      category:       self.category,
      attendee_count: 0,
      is_virtual:     self.is_virtual,
      meeting_url:    self.meeting_url,
      created_at:     now,
      updated_at:     now,
    }
  }
}

/// Parameters for [`crate::store::CivicStore::list_events`].
///
/// `upcoming` takes precedence over `category`; with neither set every event
/// is listed, latest start first.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  pub upcoming: bool,
  pub category: Option<String>,
  pub limit:    Option<usize>,
}
