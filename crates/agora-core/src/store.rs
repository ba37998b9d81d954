//! The `CivicStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends ([`crate::memory::MemoryStore`]
//! and `agora-store-sqlite`). Higher layers (`agora-api`, `agora-server`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  directory::{GovernmentLevel, NewRepresentative, Representative},
  event::{Event, EventQuery, NewEvent},
  forum::{Forum, ForumKind, NewForum, NewPost, Post},
  ledger::{AttendanceStatus, EventAttendee, PetitionSignature, PostVote, VoteType},
  news::{NewNewsArticle, NewsArticle},
  petition::{NewPetition, Petition},
  user::{UpsertUser, User},
};

// ─── Default page sizes ──────────────────────────────────────────────────────

pub const DEFAULT_POST_LIMIT: usize = 50;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_EVENT_LIMIT: usize = 50;
pub const DEFAULT_UPCOMING_EVENT_LIMIT: usize = 20;
pub const DEFAULT_PETITION_LIMIT: usize = 50;
pub const DEFAULT_ACTIVE_PETITION_LIMIT: usize = 20;
pub const DEFAULT_NEWS_LIMIT: usize = 50;
pub const DEFAULT_NEWS_CATEGORY_LIMIT: usize = 20;

// ─── Read models ─────────────────────────────────────────────────────────────

/// Live platform totals for the analytics dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
  pub total_users:      u32,
  pub total_forums:     u32,
  pub total_posts:      u32,
  pub total_events:     u32,
  pub total_petitions:  u32,
  pub total_signatures: u32,
  /// Ledger rows with status `attending`, across all events.
  pub total_attendees:  u32,
  pub total_votes:      u32,
}

// ─── Error classification ────────────────────────────────────────────────────

/// Backend errors expose the domain failure they carry, if any, so callers
/// can tell a missing post from a broken database.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

impl StoreError for crate::Error {
  fn domain(&self) -> Option<&crate::Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Agora store backend.
///
/// Entities are created with a single insert; their ids and timestamps are
/// assigned by the store. The three ledger mutations (`record_vote`,
/// `sign_petition`, `set_attendance`) write the ledger row and recompute the
/// matching aggregate counter as one atomic operation, and return the entity
/// with its updated counter.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CivicStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert or refresh a user, keeping the original `created_at`.
  fn upsert_user(
    &self,
    input: UpsertUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Forums ────────────────────────────────────────────────────────────

  /// Errors with `NotFound` if `parent_id` names a missing forum.
  fn create_forum(
    &self,
    input: NewForum,
  ) -> impl Future<Output = Result<Forum, Self::Error>> + Send + '_;

  fn get_forum(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Forum>, Self::Error>> + Send + '_;

  /// List forums ordered by name, optionally filtered by kind.
  fn list_forums(
    &self,
    kind: Option<ForumKind>,
  ) -> impl Future<Output = Result<Vec<Forum>, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Create a post and bump the forum's `post_count` in the same write.
  ///
  /// The forum must exist. A reply's parent must exist and belong to the
  /// same forum.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Top-level posts of a forum, newest first.
  fn list_posts(
    &self,
    forum_id: Uuid,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Direct replies to a post, oldest first.
  fn list_replies(
    &self,
    parent_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Case-insensitive substring match on post titles, newest first.
  fn search_posts(
    &self,
    text: String,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  fn list_events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  // ── Petitions ─────────────────────────────────────────────────────────

  fn create_petition(
    &self,
    input: NewPetition,
  ) -> impl Future<Output = Result<Petition, Self::Error>> + Send + '_;

  fn get_petition(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Petition>, Self::Error>> + Send + '_;

  /// Petitions newest first; `active_only` restricts to status `active`.
  fn list_petitions(
    &self,
    active_only: bool,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Petition>, Self::Error>> + Send + '_;

  // ── Representatives ───────────────────────────────────────────────────

  fn create_representative(
    &self,
    input: NewRepresentative,
  ) -> impl Future<Output = Result<Representative, Self::Error>> + Send + '_;

  /// Representatives ordered by name, optionally filtered by level.
  fn list_representatives(
    &self,
    level: Option<GovernmentLevel>,
  ) -> impl Future<Output = Result<Vec<Representative>, Self::Error>> + Send + '_;

  // ── News ──────────────────────────────────────────────────────────────

  /// Errors with `DuplicateArticle` if an article with the same url exists.
  fn create_news_article(
    &self,
    input: NewNewsArticle,
  ) -> impl Future<Output = Result<NewsArticle, Self::Error>> + Send + '_;

  /// Articles newest `published_at` first, optionally filtered by category.
  fn list_news(
    &self,
    category: Option<String>,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<NewsArticle>, Self::Error>> + Send + '_;

  // ── Vote ledger ───────────────────────────────────────────────────────

  /// Set `user_id`'s vote on a post and recompute the post's counters.
  ///
  /// Switching type overwrites the previous vote; repeating the same type
  /// changes nothing. Errors with `NotFound` if the post does not exist.
  fn record_vote(
    &self,
    post_id: Uuid,
    user_id: String,
    vote_type: VoteType,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_vote(
    &self,
    post_id: Uuid,
    user_id: String,
  ) -> impl Future<Output = Result<Option<PostVote>, Self::Error>> + Send + '_;

  // ── Signature ledger ──────────────────────────────────────────────────

  /// Add `user_id`'s signature and increment the petition's counter.
  ///
  /// Errors with `NotFound` for a missing petition, `AlreadySigned` for a
  /// repeat signer and `PetitionClosed` unless the petition is active and
  /// before its deadline. An active petition found past its deadline is
  /// closed as a side effect. Reaching the target marks it `successful`.
  fn sign_petition(
    &self,
    petition_id: Uuid,
    user_id: String,
    comment: Option<String>,
  ) -> impl Future<Output = Result<Petition, Self::Error>> + Send + '_;

  /// Signatures oldest first. Errors with `NotFound` for a missing petition.
  fn list_signatures(
    &self,
    petition_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PetitionSignature>, Self::Error>> + Send + '_;

  // ── Attendance ledger ─────────────────────────────────────────────────

  /// Upsert `user_id`'s RSVP and recompute `attendee_count`.
  /// Errors with `NotFound` if the event does not exist.
  fn set_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
    status: AttendanceStatus,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
  ) -> impl Future<Output = Result<Option<EventAttendee>, Self::Error>> + Send + '_;

  /// Every RSVP for an event regardless of status, oldest first.
  /// Errors with `NotFound` if the event does not exist.
  fn list_attendees(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EventAttendee>, Self::Error>> + Send + '_;

  // ── Analytics ─────────────────────────────────────────────────────────

  fn summary(
    &self,
  ) -> impl Future<Output = Result<ActivitySummary, Self::Error>> + Send + '_;
}
