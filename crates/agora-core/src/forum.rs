//! Forums and posts.
//!
//! A forum groups posts either by place or by topic. Posts carry two
//! aggregate counters, `upvotes` and `downvotes`, which mirror the vote ledger
//! (see [`crate::ledger`]) and are never written on their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, error::require_text};

// ─── Forum ───────────────────────────────────────────────────────────────────

/// Whether a forum is scoped to a place or to a subject.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForumKind {
  Location,
  Topic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forum {
  pub forum_id:    Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub kind:        ForumKind,
  pub location:    Option<String>,
  /// Enclosing forum, e.g. a neighbourhood inside a city.
  pub parent_id:   Option<Uuid>,
  pub tags:        Vec<String>,
  /// Number of posts (including replies) created in this forum.
  pub post_count:  u32,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::create_forum`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewForum {
  pub name:        String,
  pub description: Option<String>,
  pub kind:        ForumKind,
  pub location:    Option<String>,
  #[serde(alias = "parentId")]
  pub parent_id:   Option<Uuid>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

impl NewForum {
  pub fn new(name: impl Into<String>, kind: ForumKind) -> Self {
    Self {
      name: name.into(),
      description: None,
      kind,
      location: None,
      parent_id: None,
      tags: Vec::new(),
    }
  }

  pub fn validate(&self) -> Result<()> { require_text("forum name", &self.name) }

  pub fn into_forum(self, now: DateTime<Utc>) -> Forum {
    Forum {
      forum_id:    Uuid::new_v4(),
      name:        self.name,
      description: self.description,
      kind:        self.kind,
      location:    self.location,
      parent_id:   self.parent_id,
      tags:        self.tags,
      post_count:  0,
      is_active:   true,
      created_at:  now,
      updated_at:  now,
    }
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub title:      String,
  pub content:    String,
  pub author_id:  String,
  pub forum_id:   Uuid,
  /// Set for replies; top-level posts have no parent.
  pub parent_id:  Option<Uuid>,
  pub upvotes:    u32,
  pub downvotes:  u32,
  pub is_sticky:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::create_post`]. Counters always start
/// at zero and are not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:     String,
  pub content:   String,
  pub author_id: String,
  pub forum_id:  Uuid,
  pub parent_id: Option<Uuid>,
  pub is_sticky: bool,
}

impl NewPost {
  pub fn new(
    forum_id: Uuid,
    author_id: impl Into<String>,
    title: impl Into<String>,
    content: impl Into<String>,
  ) -> Self {
    Self {
      title: title.into(),
      content: content.into(),
      author_id: author_id.into(),
      forum_id,
      parent_id: None,
      is_sticky: false,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("post title", &self.title)?;
    require_text("post content", &self.content)?;
    require_text("author id", &self.author_id)
  }

  pub fn into_post(self, now: DateTime<Utc>) -> Post {
    Post {
      post_id:    Uuid::new_v4(),
      title:      self.title,
      content:    self.content,
      author_id:  self.author_id,
      forum_id:   self.forum_id,
      parent_id:  self.parent_id,
      upvotes:    0,
      downvotes:  0,
      is_sticky:  self.is_sticky,
      created_at: now,
      updated_at: now,
    }
  }
}
