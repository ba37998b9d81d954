//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL orders them correctly. Enums are
//! stored as their wire names, string lists as compact JSON, and UUIDs as
//! hyphenated lowercase strings.

use std::str::FromStr;

use agora_core::{
  directory::Representative,
  event::Event,
  forum::{Forum, Post},
  ledger::{EventAttendee, PetitionSignature, PostVote},
  news::NewsArticle,
  petition::Petition,
  user::User,
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_choice(value: impl AsRef<str>) -> String {
  value.as_ref().to_owned()
}

/// Decode an enum column written with [`encode_choice`].
pub fn decode_choice<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue {
    column,
    value: s.to_owned(),
  })
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` struct holds the columns of one table exactly as SQLite returns
// them; `*_COLUMNS` is the matching SELECT list in the same order.

pub const USER_COLUMNS: &str = "user_id, email, first_name, last_name, \
  profile_image_url, location, bio, interests, last_active, created_at, \
  updated_at";

pub struct RawUser {
  pub user_id:           String,
  pub email:             Option<String>,
  pub first_name:        Option<String>,
  pub last_name:         Option<String>,
  pub profile_image_url: Option<String>,
  pub location:          Option<String>,
  pub bio:               Option<String>,
  pub interests:         String,
  pub last_active:       Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:           row.get(0)?,
      email:             row.get(1)?,
      first_name:        row.get(2)?,
      last_name:         row.get(3)?,
      profile_image_url: row.get(4)?,
      location:          row.get(5)?,
      bio:               row.get(6)?,
      interests:         row.get(7)?,
      last_active:       row.get(8)?,
      created_at:        row.get(9)?,
      updated_at:        row.get(10)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:                self.user_id,
      email:             self.email,
      first_name:        self.first_name,
      last_name:         self.last_name,
      profile_image_url: self.profile_image_url,
      location:          self.location,
      bio:               self.bio,
      interests:         decode_list(&self.interests)?,
      last_active:       decode_opt_dt(self.last_active)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const FORUM_COLUMNS: &str = "forum_id, name, description, kind, location, \
  parent_id, tags, post_count, is_active, created_at, updated_at";

pub struct RawForum {
  pub forum_id:    String,
  pub name:        String,
  pub description: Option<String>,
  pub kind:        String,
  pub location:    Option<String>,
  pub parent_id:   Option<String>,
  pub tags:        String,
  pub post_count:  u32,
  pub is_active:   bool,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawForum {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      forum_id:    row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      kind:        row.get(3)?,
      location:    row.get(4)?,
      parent_id:   row.get(5)?,
      tags:        row.get(6)?,
      post_count:  row.get(7)?,
      is_active:   row.get(8)?,
      created_at:  row.get(9)?,
      updated_at:  row.get(10)?,
    })
  }

  pub fn into_forum(self) -> Result<Forum> {
    Ok(Forum {
      forum_id:    decode_uuid(&self.forum_id)?,
      name:        self.name,
      description: self.description,
      kind:        decode_choice("forums.kind", &self.kind)?,
      location:    self.location,
      parent_id:   decode_opt_uuid(self.parent_id)?,
      tags:        decode_list(&self.tags)?,
      post_count:  self.post_count,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

pub const POST_COLUMNS: &str = "post_id, title, content, author_id, forum_id, \
  parent_id, upvotes, downvotes, is_sticky, created_at, updated_at";

pub struct RawPost {
  pub post_id:    String,
  pub title:      String,
  pub content:    String,
  pub author_id:  String,
  pub forum_id:   String,
  pub parent_id:  Option<String>,
  pub upvotes:    u32,
  pub downvotes:  u32,
  pub is_sticky:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPost {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:    row.get(0)?,
      title:      row.get(1)?,
      content:    row.get(2)?,
      author_id:  row.get(3)?,
      forum_id:   row.get(4)?,
      parent_id:  row.get(5)?,
      upvotes:    row.get(6)?,
      downvotes:  row.get(7)?,
      is_sticky:  row.get(8)?,
      created_at: row.get(9)?,
      updated_at: row.get(10)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:    decode_uuid(&self.post_id)?,
      title:      self.title,
      content:    self.content,
      author_id:  self.author_id,
      forum_id:   decode_uuid(&self.forum_id)?,
      parent_id:  decode_opt_uuid(self.parent_id)?,
      upvotes:    self.upvotes,
      downvotes:  self.downvotes,
      is_sticky:  self.is_sticky,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "event_id, title, description, location, \
  start_time, end_time, organizer_id, category, attendee_count, is_virtual, \
  meeting_url, created_at, updated_at";

pub struct RawEvent {
  pub event_id:       String,
  pub title:          String,
  pub description:    Option<String>,
  pub location:       Option<String>,
  pub start_time:     String,
  pub end_time:       Option<String>,
  pub organizer_id:   String,
  pub category:       Option<String>,
  pub attendee_count: u32,
  pub is_virtual:     bool,
  pub meeting_url:    Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawEvent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:       row.get(0)?,
      title:          row.get(1)?,
      description:    row.get(2)?,
      location:       row.get(3)?,
      start_time:     row.get(4)?,
      end_time:       row.get(5)?,
      organizer_id:   row.get(6)?,
      category:       row.get(7)?,
      attendee_count: row.get(8)?,
      is_virtual:     row.get(9)?,
      meeting_url:    row.get(10)?,
      created_at:     row.get(11)?,
      updated_at:     row.get(12)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:       decode_uuid(&self.event_id)?,
      title:          self.title,
      description:    self.description,
      location:       self.location,
      start_time:     decode_dt(&self.start_time)?,
      end_time:       decode_opt_dt(self.end_time)?,
      organizer_id:   self.organizer_id,
      category:       self.category,
      attendee_count: self.attendee_count,
      is_virtual:     self.is_virtual,
      meeting_url:    self.meeting_url,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

pub const PETITION_COLUMNS: &str = "petition_id, title, description, \
  target_signatures, current_signatures, creator_id, category, external_url, \
  status, deadline, created_at, updated_at";

pub struct RawPetition {
  pub petition_id:        String,
  pub title:              String,
  pub description:        String,
  pub target_signatures:  u32,
  pub current_signatures: u32,
  pub creator_id:         String,
  pub category:           Option<String>,
  pub external_url:       Option<String>,
  pub status:             String,
  pub deadline:           Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawPetition {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      petition_id:        row.get(0)?,
      title:              row.get(1)?,
      description:        row.get(2)?,
      target_signatures:  row.get(3)?,
      current_signatures: row.get(4)?,
      creator_id:         row.get(5)?,
      category:           row.get(6)?,
      external_url:       row.get(7)?,
      status:             row.get(8)?,
      deadline:           row.get(9)?,
      created_at:         row.get(10)?,
      updated_at:         row.get(11)?,
    })
  }

  pub fn into_petition(self) -> Result<Petition> {
    Ok(Petition {
      petition_id:        decode_uuid(&self.petition_id)?,
      title:              self.title,
      description:        self.description,
      target_signatures:  self.target_signatures,
      current_signatures: self.current_signatures,
      creator_id:         self.creator_id,
      category:           self.category,
      external_url:       self.external_url,
      status:             decode_choice("petitions.status", &self.status)?,
      deadline:           decode_opt_dt(self.deadline)?,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

pub const REPRESENTATIVE_COLUMNS: &str = "representative_id, name, title, \
  level, electorate, party, email, phone, website, profile_image_url, \
  biography, created_at, updated_at";

pub struct RawRepresentative {
  pub representative_id: String,
  pub name:              String,
  pub title:             String,
  pub level:             String,
  pub electorate:        Option<String>,
  pub party:             Option<String>,
  pub email:             Option<String>,
  pub phone:             Option<String>,
  pub website:           Option<String>,
  pub profile_image_url: Option<String>,
  pub biography:         Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawRepresentative {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      representative_id: row.get(0)?,
      name:              row.get(1)?,
      title:             row.get(2)?,
      level:             row.get(3)?,
      electorate:        row.get(4)?,
      party:             row.get(5)?,
      email:             row.get(6)?,
      phone:             row.get(7)?,
      website:           row.get(8)?,
      profile_image_url: row.get(9)?,
      biography:         row.get(10)?,
      created_at:        row.get(11)?,
      updated_at:        row.get(12)?,
    })
  }

  pub fn into_representative(self) -> Result<Representative> {
    Ok(Representative {
      representative_id: decode_uuid(&self.representative_id)?,
      name:              self.name,
      title:             self.title,
      level:             decode_choice("representatives.level", &self.level)?,
      electorate:        self.electorate,
      party:             self.party,
      email:             self.email,
      phone:             self.phone,
      website:           self.website,
      profile_image_url: self.profile_image_url,
      biography:         self.biography,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const NEWS_COLUMNS: &str = "article_id, title, summary, content, author, \
  source, url, image_url, category, location, published_at, created_at";

pub struct RawNewsArticle {
  pub article_id:   String,
  pub title:        String,
  pub summary:      Option<String>,
  pub content:      Option<String>,
  pub author:       Option<String>,
  pub source:       String,
  pub url:          String,
  pub image_url:    Option<String>,
  pub category:     Option<String>,
  pub location:     Option<String>,
  pub published_at: String,
  pub created_at:   String,
}

impl RawNewsArticle {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      article_id:   row.get(0)?,
      title:        row.get(1)?,
      summary:      row.get(2)?,
      content:      row.get(3)?,
      author:       row.get(4)?,
      source:       row.get(5)?,
      url:          row.get(6)?,
      image_url:    row.get(7)?,
      category:     row.get(8)?,
      location:     row.get(9)?,
      published_at: row.get(10)?,
      created_at:   row.get(11)?,
    })
  }

  pub fn into_article(self) -> Result<NewsArticle> {
    Ok(NewsArticle {
      article_id:   decode_uuid(&self.article_id)?,
      title:        self.title,
      summary:      self.summary,
      content:      self.content,
      author:       self.author,
      source:       self.source,
      url:          self.url,
      image_url:    self.image_url,
      category:     self.category,
      location:     self.location,
      published_at: decode_dt(&self.published_at)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Ledger rows ─────────────────────────────────────────────────────────────

pub const VOTE_COLUMNS: &str =
  "post_id, user_id, vote_type, created_at, updated_at";

pub struct RawVote {
  pub post_id:    String,
  pub user_id:    String,
  pub vote_type:  String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawVote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:    row.get(0)?,
      user_id:    row.get(1)?,
      vote_type:  row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<PostVote> {
    Ok(PostVote {
      post_id:    decode_uuid(&self.post_id)?,
      user_id:    self.user_id,
      vote_type:  decode_choice("post_votes.vote_type", &self.vote_type)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const ATTENDEE_COLUMNS: &str =
  "event_id, user_id, status, created_at, updated_at";

pub struct RawAttendee {
  pub event_id:   String,
  pub user_id:    String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawAttendee {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      user_id:    row.get(1)?,
      status:     row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_attendee(self) -> Result<EventAttendee> {
    Ok(EventAttendee {
      event_id:   decode_uuid(&self.event_id)?,
      user_id:    self.user_id,
      status:     decode_choice("event_attendees.status", &self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const SIGNATURE_COLUMNS: &str = "petition_id, user_id, comment, created_at";

pub struct RawSignature {
  pub petition_id: String,
  pub user_id:     String,
  pub comment:     Option<String>,
  pub created_at:  String,
}

impl RawSignature {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      petition_id: row.get(0)?,
      user_id:     row.get(1)?,
      comment:     row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_signature(self) -> Result<PetitionSignature> {
    Ok(PetitionSignature {
      petition_id: decode_uuid(&self.petition_id)?,
      user_id:     self.user_id,
      comment:     self.comment,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
