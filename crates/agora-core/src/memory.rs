//! [`MemoryStore`], a map-backed [`CivicStore`] for tests and local
//! development.
//!
//! Every table lives behind one mutex, so each operation observes and
//! updates a consistent snapshot: a ledger write and its counter recompute
//! happen under the same lock.

use std::{
  cmp::Reverse,
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  EntityKind, Error, Result,
  directory::{GovernmentLevel, NewRepresentative, Representative},
  event::{Event, EventQuery, NewEvent},
  forum::{Forum, ForumKind, NewForum, NewPost, Post},
  ledger::{
    AttendanceStatus, EventAttendee, PetitionSignature, PostVote, VoteTally,
    VoteType,
  },
  news::{NewNewsArticle, NewsArticle},
  petition::{Admission, NewPetition, Petition, PetitionStatus},
  store::{self, ActivitySummary, CivicStore},
  user::{UpsertUser, User},
};

// Entity tables are vectors so listing order is insertion order before
// sorting, matching the rowid tie-break of the SQL backend.
#[derive(Default)]
struct Tables {
  users:           HashMap<String, User>,
  forums:          Vec<Forum>,
  posts:           Vec<Post>,
  events:          Vec<Event>,
  petitions:       Vec<Petition>,
  representatives: Vec<Representative>,
  news:            Vec<NewsArticle>,
  votes:           Vec<PostVote>,
  attendees:       Vec<EventAttendee>,
  signatures:      Vec<PetitionSignature>,
}

/// An in-process store. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
    // Mutations validate before touching any table, so a poisoned lock still
    // guards consistent data.
    let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut tables)
  }
}

fn newest_first<T, K: Ord>(
  rows: impl DoubleEndedIterator<Item = T>,
  key: impl Fn(&T) -> K,
  limit: usize,
) -> Vec<T> {
  let mut rows: Vec<T> = rows.rev().collect();
  rows.sort_by_key(|r| Reverse(key(r)));
  rows.truncate(limit);
  rows
}

fn count(n: usize) -> u32 { u32::try_from(n).unwrap_or(u32::MAX) }

impl Tables {
  fn post_mut(&mut self, id: Uuid) -> Result<&mut Post> {
    self
      .posts
      .iter_mut()
      .find(|p| p.post_id == id)
      .ok_or(Error::NotFound(EntityKind::Post, id))
  }

  fn event_mut(&mut self, id: Uuid) -> Result<&mut Event> {
    self
      .events
      .iter_mut()
      .find(|e| e.event_id == id)
      .ok_or(Error::NotFound(EntityKind::Event, id))
  }

  fn petition_mut(&mut self, id: Uuid) -> Result<&mut Petition> {
    self
      .petitions
      .iter_mut()
      .find(|p| p.petition_id == id)
      .ok_or(Error::NotFound(EntityKind::Petition, id))
  }
}

impl CivicStore for MemoryStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, input: UpsertUser) -> Result<User> {
    input.validate()?;
    Ok(self.with(|t| {
      let existing = t.users.get(&input.id);
      let user = input.into_user(existing, Utc::now());
      t.users.insert(user.id.clone(), user.clone());
      user
    }))
  }

  async fn get_user(&self, id: String) -> Result<Option<User>> {
    Ok(self.with(|t| t.users.get(&id).cloned()))
  }

  // ── Forums ────────────────────────────────────────────────────────────────

  async fn create_forum(&self, input: NewForum) -> Result<Forum> {
    input.validate()?;
    self.with(|t| {
      if let Some(parent) = input.parent_id
        && !t.forums.iter().any(|f| f.forum_id == parent)
      {
        return Err(Error::NotFound(EntityKind::Forum, parent));
      }
      let forum = input.into_forum(Utc::now());
      t.forums.push(forum.clone());
      Ok(forum)
    })
  }

  async fn get_forum(&self, id: Uuid) -> Result<Option<Forum>> {
    Ok(self.with(|t| t.forums.iter().find(|f| f.forum_id == id).cloned()))
  }

  async fn list_forums(&self, kind: Option<ForumKind>) -> Result<Vec<Forum>> {
    Ok(self.with(|t| {
      let mut forums: Vec<Forum> = t
        .forums
        .iter()
        .filter(|f| kind.is_none_or(|k| f.kind == k))
        .cloned()
        .collect();
      forums.sort_by(|a, b| a.name.cmp(&b.name));
      forums
    }))
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    input.validate()?;
    self.with(|t| {
      let forum_id = input.forum_id;
      if !t.forums.iter().any(|f| f.forum_id == forum_id) {
        return Err(Error::NotFound(EntityKind::Forum, forum_id));
      }
      if let Some(parent_id) = input.parent_id {
        let parent = t
          .posts
          .iter()
          .find(|p| p.post_id == parent_id)
          .ok_or(Error::NotFound(EntityKind::Post, parent_id))?;
        if parent.forum_id != forum_id {
          return Err(Error::InvalidArgument(format!(
            "parent post {parent_id} belongs to a different forum"
          )));
        }
      }

      let now = Utc::now();
      let post = input.into_post(now);
      t.posts.push(post.clone());
      if let Some(forum) = t.forums.iter_mut().find(|f| f.forum_id == forum_id) {
        forum.post_count += 1;
        forum.updated_at = now;
      }
      Ok(post)
    })
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    Ok(self.with(|t| t.posts.iter().find(|p| p.post_id == id).cloned()))
  }

  async fn list_posts(
    &self,
    forum_id: Uuid,
    limit: Option<usize>,
  ) -> Result<Vec<Post>> {
    Ok(self.with(|t| {
      newest_first(
        t.posts
          .iter()
          .filter(|p| p.forum_id == forum_id && p.parent_id.is_none())
          .cloned(),
        |p| p.created_at,
        limit.unwrap_or(store::DEFAULT_POST_LIMIT),
      )
    }))
  }

  async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Post>> {
    Ok(self.with(|t| {
      let mut replies: Vec<Post> = t
        .posts
        .iter()
        .filter(|p| p.parent_id == Some(parent_id))
        .cloned()
        .collect();
      replies.sort_by_key(|p| p.created_at);
      replies
    }))
  }

  async fn search_posts(
    &self,
    text: String,
    limit: Option<usize>,
  ) -> Result<Vec<Post>> {
    crate::error::require_text("search text", &text)?;
    let needle = text.to_lowercase();
    Ok(self.with(|t| {
      newest_first(
        t.posts
          .iter()
          .filter(|p| p.title.to_lowercase().contains(&needle))
          .cloned(),
        |p| p.created_at,
        limit.unwrap_or(store::DEFAULT_SEARCH_LIMIT),
      )
    }))
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;
    Ok(self.with(|t| {
      let event = input.into_event(Utc::now());
      t.events.push(event.clone());
      event
    }))
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    Ok(self.with(|t| t.events.iter().find(|e| e.event_id == id).cloned()))
  }

  async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
    let now = Utc::now();
    Ok(self.with(|t| {
      if query.upcoming {
        let mut events: Vec<Event> =
          t.events.iter().filter(|e| e.start_time > now).cloned().collect();
        events.sort_by_key(|e| e.start_time);
        events.truncate(query.limit.unwrap_or(store::DEFAULT_UPCOMING_EVENT_LIMIT));
        events
      } else if let Some(category) = &query.category {
        let mut events: Vec<Event> = t
          .events
          .iter()
          .filter(|e| e.category.as_ref() == Some(category))
          .cloned()
          .collect();
        events.sort_by_key(|e| e.start_time);
        events
      } else {
        newest_first(
          t.events.iter().cloned(),
          |e| e.start_time,
          query.limit.unwrap_or(store::DEFAULT_EVENT_LIMIT),
        )
      }
    }))
  }

  // ── Petitions ─────────────────────────────────────────────────────────────

  async fn create_petition(&self, input: NewPetition) -> Result<Petition> {
    input.validate()?;
    Ok(self.with(|t| {
      let petition = input.into_petition(Utc::now());
      t.petitions.push(petition.clone());
      petition
    }))
  }

  async fn get_petition(&self, id: Uuid) -> Result<Option<Petition>> {
    Ok(self.with(|t| t.petitions.iter().find(|p| p.petition_id == id).cloned()))
  }

  async fn list_petitions(
    &self,
    active_only: bool,
    limit: Option<usize>,
  ) -> Result<Vec<Petition>> {
    let default_limit = if active_only {
      store::DEFAULT_ACTIVE_PETITION_LIMIT
    } else {
      store::DEFAULT_PETITION_LIMIT
    };
    Ok(self.with(|t| {
      newest_first(
        t.petitions
          .iter()
          .filter(|p| !active_only || p.status == PetitionStatus::Active)
          .cloned(),
        |p| p.created_at,
        limit.unwrap_or(default_limit),
      )
    }))
  }

  // ── Representatives ───────────────────────────────────────────────────────

  async fn create_representative(
    &self,
    input: NewRepresentative,
  ) -> Result<Representative> {
    input.validate()?;
    Ok(self.with(|t| {
      let rep = input.into_representative(Utc::now());
      t.representatives.push(rep.clone());
      rep
    }))
  }

  async fn list_representatives(
    &self,
    level: Option<GovernmentLevel>,
  ) -> Result<Vec<Representative>> {
    Ok(self.with(|t| {
      let mut reps: Vec<Representative> = t
        .representatives
        .iter()
        .filter(|r| level.is_none_or(|l| r.level == l))
        .cloned()
        .collect();
      reps.sort_by(|a, b| a.name.cmp(&b.name));
      reps
    }))
  }

  // ── News ──────────────────────────────────────────────────────────────────

  async fn create_news_article(
    &self,
    input: NewNewsArticle,
  ) -> Result<NewsArticle> {
    input.validate()?;
    self.with(|t| {
      if t.news.iter().any(|a| a.url == input.url) {
        return Err(Error::DuplicateArticle(input.url));
      }
      let article = input.into_article(Utc::now());
      t.news.push(article.clone());
      Ok(article)
    })
  }

  async fn list_news(
    &self,
    category: Option<String>,
    limit: Option<usize>,
  ) -> Result<Vec<NewsArticle>> {
    let default_limit = if category.is_some() {
      store::DEFAULT_NEWS_CATEGORY_LIMIT
    } else {
      store::DEFAULT_NEWS_LIMIT
    };
    Ok(self.with(|t| {
      newest_first(
        t.news
          .iter()
          .filter(|a| category.is_none() || a.category == category)
          .cloned(),
        |a| a.published_at,
        limit.unwrap_or(default_limit),
      )
    }))
  }

  // ── Vote ledger ───────────────────────────────────────────────────────────

  async fn record_vote(
    &self,
    post_id: Uuid,
    user_id: String,
    vote_type: VoteType,
  ) -> Result<Post> {
    self.with(|t| {
      t.post_mut(post_id)?;
      let now = Utc::now();

      match t
        .votes
        .iter_mut()
        .find(|v| v.post_id == post_id && v.user_id == user_id)
      {
        Some(existing) if existing.vote_type == vote_type => {}
        Some(existing) => {
          existing.vote_type = vote_type;
          existing.updated_at = now;
        }
        None => t.votes.push(PostVote {
          post_id,
          user_id,
          vote_type,
          created_at: now,
          updated_at: now,
        }),
      }

      let tally = VoteTally::count(
        t.votes
          .iter()
          .filter(|v| v.post_id == post_id)
          .map(|v| &v.vote_type),
      );
      let post = t.post_mut(post_id)?;
      post.upvotes = tally.upvotes;
      post.downvotes = tally.downvotes;
      post.updated_at = now;
      Ok(post.clone())
    })
  }

  async fn get_vote(
    &self,
    post_id: Uuid,
    user_id: String,
  ) -> Result<Option<PostVote>> {
    Ok(self.with(|t| {
      t.votes
        .iter()
        .find(|v| v.post_id == post_id && v.user_id == user_id)
        .cloned()
    }))
  }

  // ── Signature ledger ──────────────────────────────────────────────────────

  async fn sign_petition(
    &self,
    petition_id: Uuid,
    user_id: String,
    comment: Option<String>,
  ) -> Result<Petition> {
    self.with(|t| {
      let now = Utc::now();
      let petition = t.petition_mut(petition_id)?;
      match petition.admission(now) {
        Admission::Open => {}
        Admission::Expired => {
          petition.status = PetitionStatus::Closed;
          petition.updated_at = now;
          return Err(Error::PetitionClosed(petition_id));
        }
        Admission::Refused => return Err(Error::PetitionClosed(petition_id)),
      }

      if t
        .signatures
        .iter()
        .any(|s| s.petition_id == petition_id && s.user_id == user_id)
      {
        return Err(Error::AlreadySigned { petition_id, user_id });
      }

      t.signatures.push(PetitionSignature {
        petition_id,
        user_id,
        comment,
        created_at: now,
      });

      let petition = t.petition_mut(petition_id)?;
      petition.current_signatures += 1;
      petition.status = petition
        .status
        .after_signature(petition.current_signatures, petition.target_signatures);
      petition.updated_at = now;
      Ok(petition.clone())
    })
  }

  async fn list_signatures(
    &self,
    petition_id: Uuid,
  ) -> Result<Vec<PetitionSignature>> {
    self.with(|t| {
      t.petition_mut(petition_id)?;
      let mut signatures: Vec<PetitionSignature> = t
        .signatures
        .iter()
        .filter(|s| s.petition_id == petition_id)
        .cloned()
        .collect();
      signatures.sort_by_key(|s| s.created_at);
      Ok(signatures)
    })
  }

  // ── Attendance ledger ─────────────────────────────────────────────────────

  async fn set_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
    status: AttendanceStatus,
  ) -> Result<Event> {
    self.with(|t| {
      t.event_mut(event_id)?;
      let now = Utc::now();

      match t
        .attendees
        .iter_mut()
        .find(|a| a.event_id == event_id && a.user_id == user_id)
      {
        Some(existing) if existing.status == status => {}
        Some(existing) => {
          existing.status = status;
          existing.updated_at = now;
        }
        None => t.attendees.push(EventAttendee {
          event_id,
          user_id,
          status,
          created_at: now,
          updated_at: now,
        }),
      }

      let attending = t
        .attendees
        .iter()
        .filter(|a| a.event_id == event_id && a.status.is_attending())
        .count();
      let event = t.event_mut(event_id)?;
      event.attendee_count = count(attending);
      event.updated_at = now;
      Ok(event.clone())
    })
  }

  async fn get_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
  ) -> Result<Option<EventAttendee>> {
    Ok(self.with(|t| {
      t.attendees
        .iter()
        .find(|a| a.event_id == event_id && a.user_id == user_id)
        .cloned()
    }))
  }

  async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<EventAttendee>> {
    self.with(|t| {
      t.event_mut(event_id)?;
      let mut attendees: Vec<EventAttendee> = t
        .attendees
        .iter()
        .filter(|a| a.event_id == event_id)
        .cloned()
        .collect();
      attendees.sort_by_key(|a| a.created_at);
      Ok(attendees)
    })
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  async fn summary(&self) -> Result<ActivitySummary> {
    Ok(self.with(|t| ActivitySummary {
      total_users:      count(t.users.len()),
      total_forums:     count(t.forums.len()),
      total_posts:      count(t.posts.len()),
      total_events:     count(t.events.len()),
      total_petitions:  count(t.petitions.len()),
      total_signatures: count(t.signatures.len()),
      total_attendees:  count(
        t.attendees.iter().filter(|a| a.status.is_attending()).count(),
      ),
      total_votes:      count(t.votes.len()),
    }))
  }
}
