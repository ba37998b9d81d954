//! Ledgers: one row per (entity, user) pair holding that user's current
//! choice for the entity.
//!
//! Each ledger backs an aggregate counter on its entity:
//!
//! | Ledger | Counter |
//! |--------|---------|
//! | [`PostVote`] | `Post::upvotes`, `Post::downvotes` |
//! | [`EventAttendee`] | `Event::attendee_count` (status `attending` only) |
//! | [`PetitionSignature`] | `Petition::current_signatures` |
//!
//! Ledger rows are never deleted. Votes and attendance are mutable slots that
//! can be overwritten; a signature is written once.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

fn parse_choice<T: FromStr>(what: &str, raw: &str) -> Result<T> {
  raw
    .parse()
    .map_err(|_| Error::InvalidArgument(format!("unknown {what}: {raw:?}")))
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VoteType {
  Upvote,
  Downvote,
}

impl VoteType {
  /// Parse a wire value, rejecting anything but `upvote` / `downvote`.
  pub fn parse(raw: &str) -> Result<Self> { parse_choice("vote type", raw) }
}

/// A user's single current vote on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostVote {
  pub post_id:    Uuid,
  pub user_id:    String,
  pub vote_type:  VoteType,
  pub created_at: DateTime<Utc>,
  /// Bumped only when the vote actually changes.
  pub updated_at: DateTime<Utc>,
}

/// Upvote and downvote counts derived from a set of votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
  pub upvotes:   u32,
  pub downvotes: u32,
}

impl VoteTally {
  pub fn count<'a>(votes: impl IntoIterator<Item = &'a VoteType>) -> Self {
    votes.into_iter().fold(Self::default(), |mut tally, vote| {
      match vote {
        VoteType::Upvote => tally.upvotes += 1,
        VoteType::Downvote => tally.downvotes += 1,
      }
      tally
    })
  }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
  #[default]
  Attending,
  Maybe,
  NotAttending,
}

impl AttendanceStatus {
  pub fn parse(raw: &str) -> Result<Self> {
    parse_choice("attendance status", raw)
  }

  /// Whether this status contributes to `Event::attendee_count`.
  pub fn is_attending(self) -> bool { self == Self::Attending }
}

/// A user's current RSVP for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttendee {
  pub event_id:   Uuid,
  pub user_id:    String,
  pub status:     AttendanceStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Signatures ──────────────────────────────────────────────────────────────

/// A user's signature on a petition. At most one per (petition, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetitionSignature {
  pub petition_id: Uuid,
  pub user_id:     String,
  pub comment:     Option<String>,
  pub created_at:  DateTime<Utc>,
}
