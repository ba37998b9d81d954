//! [`SqliteStore`]: the SQLite implementation of [`CivicStore`].
//!
//! Reads run as plain statements. Every write that checks a domain rule
//! first runs inside an `IMMEDIATE` transaction in one of the `*_tx`
//! helpers below, so the check, the ledger row and the counter recompute
//! commit together or not at all.

use std::path::Path;

use rusqlite::{
  Connection, OptionalExtension as _, Params, Row, TransactionBehavior, params,
};
use uuid::Uuid;

use agora_core::{
  EntityKind,
  directory::{GovernmentLevel, NewRepresentative, Representative},
  event::{Event, EventQuery, NewEvent},
  forum::{Forum, ForumKind, NewForum, NewPost, Post},
  ledger::{
    AttendanceStatus, EventAttendee, PetitionSignature, PostVote, VoteType,
  },
  news::{NewNewsArticle, NewsArticle},
  petition::{Admission, NewPetition, Petition, PetitionStatus},
  store::{self, ActivitySummary, CivicStore},
  user::{UpsertUser, User},
};

use crate::{
  Result,
  encode::{
    ATTENDEE_COLUMNS, EVENT_COLUMNS, FORUM_COLUMNS, NEWS_COLUMNS,
    PETITION_COLUMNS, POST_COLUMNS, REPRESENTATIVE_COLUMNS, RawAttendee,
    RawEvent, RawForum, RawNewsArticle, RawPetition, RawPost,
    RawRepresentative, RawSignature, RawUser, RawVote, SIGNATURE_COLUMNS,
    USER_COLUMNS, VOTE_COLUMNS, encode_choice, encode_dt, encode_list,
    encode_uuid, now,
  },
  schema::SCHEMA,
};

type CoreError = agora_core::Error;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Agora store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

fn query_all<T, P, F>(
  conn: &Connection,
  sql: &str,
  params: P,
  map: F,
) -> rusqlite::Result<Vec<T>>
where
  P: Params,
  F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params, map)?
    .collect::<rusqlite::Result<Vec<T>>>()?;
  Ok(rows)
}

fn exists(conn: &Connection, sql: &str, id: &str) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn fetch_user(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
      [id],
      RawUser::from_row,
    )
    .optional()
}

fn fetch_forum(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawForum>> {
  conn
    .query_row(
      &format!("SELECT {FORUM_COLUMNS} FROM forums WHERE forum_id = ?1"),
      [id],
      RawForum::from_row,
    )
    .optional()
}

fn fetch_post(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawPost>> {
  conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1"),
      [id],
      RawPost::from_row,
    )
    .optional()
}

fn fetch_event(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawEvent>> {
  conn
    .query_row(
      &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
      [id],
      RawEvent::from_row,
    )
    .optional()
}

fn fetch_petition(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawPetition>> {
  conn
    .query_row(
      &format!("SELECT {PETITION_COLUMNS} FROM petitions WHERE petition_id = ?1"),
      [id],
      RawPetition::from_row,
    )
    .optional()
}

fn decode_all<R, T>(
  rows: Vec<R>,
  decode: impl FnMut(R) -> Result<T>,
) -> Result<Vec<T>> {
  rows.into_iter().map(decode).collect()
}

// ─── Transactional writes ────────────────────────────────────────────────────

/// Insert or refresh a user in one statement; `created_at` survives the
/// conflict branch.
fn upsert_user_row(conn: &Connection, user: &User) -> Result<RawUser> {
  let raw = conn.query_row(
    &format!(
      "INSERT INTO users (
         user_id, email, first_name, last_name, profile_image_url, location,
         bio, interests, last_active, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
       ON CONFLICT(user_id) DO UPDATE SET
         email             = excluded.email,
         first_name        = excluded.first_name,
         last_name         = excluded.last_name,
         profile_image_url = excluded.profile_image_url,
         location          = excluded.location,
         bio               = excluded.bio,
         interests         = excluded.interests,
         last_active       = excluded.last_active,
         updated_at        = excluded.updated_at
       RETURNING {USER_COLUMNS}"
    ),
    params![
      user.id,
      user.email,
      user.first_name,
      user.last_name,
      user.profile_image_url,
      user.location,
      user.bio,
      encode_list(&user.interests)?,
      user.last_active.map(encode_dt),
      encode_dt(user.updated_at),
    ],
    RawUser::from_row,
  )?;
  Ok(raw)
}

fn insert_forum_tx(conn: &mut Connection, forum: &Forum) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  if let Some(parent) = forum.parent_id
    && !exists(
      &tx,
      "SELECT 1 FROM forums WHERE forum_id = ?1",
      &encode_uuid(parent),
    )?
  {
    return Err(CoreError::NotFound(EntityKind::Forum, parent).into());
  }
  tx.execute(
    "INSERT INTO forums (
       forum_id, name, description, kind, location, parent_id, tags,
       post_count, is_active, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      encode_uuid(forum.forum_id),
      forum.name,
      forum.description,
      encode_choice(forum.kind),
      forum.location,
      forum.parent_id.map(encode_uuid),
      encode_list(&forum.tags)?,
      forum.post_count,
      forum.is_active,
      encode_dt(forum.created_at),
      encode_dt(forum.updated_at),
    ],
  )?;
  tx.commit()?;
  Ok(())
}

fn insert_post_tx(conn: &mut Connection, post: &Post) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let forum_id = encode_uuid(post.forum_id);
  if !exists(&tx, "SELECT 1 FROM forums WHERE forum_id = ?1", &forum_id)? {
    return Err(CoreError::NotFound(EntityKind::Forum, post.forum_id).into());
  }
  if let Some(parent_id) = post.parent_id {
    let parent_forum: Option<String> = tx
      .query_row(
        "SELECT forum_id FROM posts WHERE post_id = ?1",
        [encode_uuid(parent_id)],
        |r| r.get(0),
      )
      .optional()?;
    match parent_forum {
      None => return Err(CoreError::NotFound(EntityKind::Post, parent_id).into()),
      Some(f) if f != forum_id => {
        return Err(
          CoreError::InvalidArgument(format!(
            "parent post {parent_id} belongs to a different forum"
          ))
          .into(),
        );
      }
      Some(_) => {}
    }
  }

  let at = encode_dt(post.created_at);
  tx.execute(
    "INSERT INTO posts (
       post_id, title, content, author_id, forum_id, parent_id,
       upvotes, downvotes, is_sticky, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8, ?8)",
    params![
      encode_uuid(post.post_id),
      post.title,
      post.content,
      post.author_id,
      forum_id,
      post.parent_id.map(encode_uuid),
      post.is_sticky,
      at,
    ],
  )?;
  tx.execute(
    "UPDATE forums SET post_count = post_count + 1, updated_at = ?2
     WHERE forum_id = ?1",
    params![forum_id, at],
  )?;
  tx.commit()?;
  Ok(())
}

fn insert_article_tx(conn: &mut Connection, article: &NewsArticle) -> Result<()> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  if exists(&tx, "SELECT 1 FROM news_articles WHERE url = ?1", &article.url)? {
    return Err(CoreError::DuplicateArticle(article.url.clone()).into());
  }
  tx.execute(
    "INSERT INTO news_articles (
       article_id, title, summary, content, author, source, url, image_url,
       category, location, published_at, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    params![
      encode_uuid(article.article_id),
      article.title,
      article.summary,
      article.content,
      article.author,
      article.source,
      article.url,
      article.image_url,
      article.category,
      article.location,
      encode_dt(article.published_at),
      encode_dt(article.created_at),
    ],
  )?;
  tx.commit()?;
  Ok(())
}

fn record_vote_tx(
  conn: &mut Connection,
  post_id: Uuid,
  user_id: &str,
  vote_type: VoteType,
) -> Result<Post> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let id = encode_uuid(post_id);
  let at = encode_dt(now());
  if !exists(&tx, "SELECT 1 FROM posts WHERE post_id = ?1", &id)? {
    return Err(CoreError::NotFound(EntityKind::Post, post_id).into());
  }

  // Same vote again leaves the row untouched.
  tx.execute(
    "INSERT INTO post_votes (post_id, user_id, vote_type, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?4)
     ON CONFLICT(post_id, user_id) DO UPDATE SET
       vote_type  = excluded.vote_type,
       updated_at = excluded.updated_at
     WHERE post_votes.vote_type != excluded.vote_type",
    params![id, user_id, encode_choice(vote_type), at],
  )?;
  tx.execute(
    "UPDATE posts SET
       upvotes   = (SELECT COUNT(*) FROM post_votes
                    WHERE post_id = ?1 AND vote_type = 'upvote'),
       downvotes = (SELECT COUNT(*) FROM post_votes
                    WHERE post_id = ?1 AND vote_type = 'downvote'),
       updated_at = ?2
     WHERE post_id = ?1",
    params![id, at],
  )?;

  let raw = fetch_post(&tx, &id)?
    .ok_or(CoreError::NotFound(EntityKind::Post, post_id))?;
  tx.commit()?;
  raw.into_post()
}

fn sign_petition_tx(
  conn: &mut Connection,
  petition_id: Uuid,
  user_id: String,
  comment: Option<String>,
) -> Result<Petition> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let id = encode_uuid(petition_id);
  let now = now();
  let at = encode_dt(now);

  let petition = fetch_petition(&tx, &id)?
    .ok_or(CoreError::NotFound(EntityKind::Petition, petition_id))?
    .into_petition()?;
  match petition.admission(now) {
    Admission::Open => {}
    Admission::Expired => {
      tx.execute(
        "UPDATE petitions SET status = ?2, updated_at = ?3 WHERE petition_id = ?1",
        params![id, encode_choice(PetitionStatus::Closed), at],
      )?;
      tx.commit()?;
      return Err(CoreError::PetitionClosed(petition_id).into());
    }
    Admission::Refused => {
      return Err(CoreError::PetitionClosed(petition_id).into());
    }
  }

  let inserted = tx.execute(
    "INSERT INTO petition_signatures (petition_id, user_id, comment, created_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(petition_id, user_id) DO NOTHING",
    params![id, user_id, comment, at],
  )?;
  if inserted == 0 {
    return Err(CoreError::AlreadySigned { petition_id, user_id }.into());
  }

  let status = petition.status.after_signature(
    petition.current_signatures + 1,
    petition.target_signatures,
  );
  tx.execute(
    "UPDATE petitions SET
       current_signatures = current_signatures + 1,
       status     = ?2,
       updated_at = ?3
     WHERE petition_id = ?1",
    params![id, encode_choice(status), at],
  )?;

  let raw = fetch_petition(&tx, &id)?
    .ok_or(CoreError::NotFound(EntityKind::Petition, petition_id))?;
  tx.commit()?;
  raw.into_petition()
}

fn set_attendance_tx(
  conn: &mut Connection,
  event_id: Uuid,
  user_id: &str,
  status: AttendanceStatus,
) -> Result<Event> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let id = encode_uuid(event_id);
  let at = encode_dt(now());
  if !exists(&tx, "SELECT 1 FROM events WHERE event_id = ?1", &id)? {
    return Err(CoreError::NotFound(EntityKind::Event, event_id).into());
  }

  tx.execute(
    "INSERT INTO event_attendees (event_id, user_id, status, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?4)
     ON CONFLICT(event_id, user_id) DO UPDATE SET
       status     = excluded.status,
       updated_at = excluded.updated_at
     WHERE event_attendees.status != excluded.status",
    params![id, user_id, encode_choice(status), at],
  )?;
  tx.execute(
    "UPDATE events SET
       attendee_count = (SELECT COUNT(*) FROM event_attendees
                         WHERE event_id = ?1 AND status = 'attending'),
       updated_at = ?2
     WHERE event_id = ?1",
    params![id, at],
  )?;

  let raw = fetch_event(&tx, &id)?
    .ok_or(CoreError::NotFound(EntityKind::Event, event_id))?;
  tx.commit()?;
  raw.into_event()
}

// ─── CivicStore impl ─────────────────────────────────────────────────────────

impl CivicStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, input: UpsertUser) -> Result<User> {
    input.validate()?;
    let user = input.into_user(None, now());
    let raw = self
      .conn
      .call(move |conn| Ok(upsert_user_row(conn, &user)))
      .await??;
    raw.into_user()
  }

  async fn get_user(&self, id: String) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_user(conn, &id)?))
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  // ── Forums ────────────────────────────────────────────────────────────────

  async fn create_forum(&self, input: NewForum) -> Result<Forum> {
    input.validate()?;
    let forum = input.into_forum(now());
    let row = forum.clone();
    self
      .conn
      .call(move |conn| Ok(insert_forum_tx(conn, &row)))
      .await??;
    Ok(forum)
  }

  async fn get_forum(&self, id: Uuid) -> Result<Option<Forum>> {
    let id = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_forum(conn, &id)?))
      .await?;
    raw.map(RawForum::into_forum).transpose()
  }

  async fn list_forums(&self, kind: Option<ForumKind>) -> Result<Vec<Forum>> {
    let kind = kind.map(encode_choice);
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {FORUM_COLUMNS} FROM forums
             WHERE ?1 IS NULL OR kind = ?1
             ORDER BY name, rowid"
          ),
          params![kind],
          RawForum::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawForum::into_forum)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    input.validate()?;
    let post = input.into_post(now());
    let row = post.clone();
    self
      .conn
      .call(move |conn| Ok(insert_post_tx(conn, &row)))
      .await??;
    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_post(conn, &id)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(
    &self,
    forum_id: Uuid,
    limit: Option<usize>,
  ) -> Result<Vec<Post>> {
    let forum_id = encode_uuid(forum_id);
    let limit = sql_limit(limit.unwrap_or(store::DEFAULT_POST_LIMIT));
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE forum_id = ?1 AND parent_id IS NULL
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
          ),
          params![forum_id, limit],
          RawPost::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawPost::into_post)
  }

  async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Post>> {
    let parent_id = encode_uuid(parent_id);
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE parent_id = ?1
             ORDER BY created_at, rowid"
          ),
          [parent_id],
          RawPost::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawPost::into_post)
  }

  async fn search_posts(
    &self,
    text: String,
    limit: Option<usize>,
  ) -> Result<Vec<Post>> {
    agora_core::error::require_text("search text", &text)?;
    let limit = sql_limit(limit.unwrap_or(store::DEFAULT_SEARCH_LIMIT));
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE instr(lower(title), lower(?1)) > 0
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
          ),
          params![text, limit],
          RawPost::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawPost::into_post)
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;
    let event = input.into_event(now());
    let e = event.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, title, description, location, start_time, end_time,
             organizer_id, category, attendee_count, is_virtual, meeting_url,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12)",
          params![
            encode_uuid(e.event_id),
            e.title,
            e.description,
            e.location,
            encode_dt(e.start_time),
            e.end_time.map(encode_dt),
            e.organizer_id,
            e.category,
            e.is_virtual,
            e.meeting_url,
            encode_dt(e.created_at),
            encode_dt(e.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_event(conn, &id)?))
      .await?;
    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
    let at = encode_dt(now());
    let rows = self
      .conn
      .call(move |conn| {
        let rows = if query.upcoming {
          let limit =
            sql_limit(query.limit.unwrap_or(store::DEFAULT_UPCOMING_EVENT_LIMIT));
          query_all(
            conn,
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               WHERE start_time > ?1
               ORDER BY start_time, rowid
               LIMIT ?2"
            ),
            params![at, limit],
            RawEvent::from_row,
          )?
        } else if let Some(category) = query.category {
          query_all(
            conn,
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               WHERE category = ?1
               ORDER BY start_time, rowid"
            ),
            [category],
            RawEvent::from_row,
          )?
        } else {
          let limit = sql_limit(query.limit.unwrap_or(store::DEFAULT_EVENT_LIMIT));
          query_all(
            conn,
            &format!(
              "SELECT {EVENT_COLUMNS} FROM events
               ORDER BY start_time DESC, rowid DESC
               LIMIT ?1"
            ),
            [limit],
            RawEvent::from_row,
          )?
        };
        Ok(rows)
      })
      .await?;
    decode_all(rows, RawEvent::into_event)
  }

  // ── Petitions ─────────────────────────────────────────────────────────────

  async fn create_petition(&self, input: NewPetition) -> Result<Petition> {
    input.validate()?;
    let petition = input.into_petition(now());
    let p = petition.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO petitions (
             petition_id, title, description, target_signatures,
             current_signatures, creator_id, category, external_url, status,
             deadline, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          params![
            encode_uuid(p.petition_id),
            p.title,
            p.description,
            p.target_signatures,
            p.creator_id,
            p.category,
            p.external_url,
            encode_choice(p.status),
            p.deadline.map(encode_dt),
            encode_dt(p.created_at),
            encode_dt(p.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(petition)
  }

  async fn get_petition(&self, id: Uuid) -> Result<Option<Petition>> {
    let id = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_petition(conn, &id)?))
      .await?;
    raw.map(RawPetition::into_petition).transpose()
  }

  async fn list_petitions(
    &self,
    active_only: bool,
    limit: Option<usize>,
  ) -> Result<Vec<Petition>> {
    let limit = sql_limit(limit.unwrap_or(if active_only {
      store::DEFAULT_ACTIVE_PETITION_LIMIT
    } else {
      store::DEFAULT_PETITION_LIMIT
    }));
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {PETITION_COLUMNS} FROM petitions
             WHERE NOT ?1 OR status = 'active'
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
          ),
          params![active_only, limit],
          RawPetition::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawPetition::into_petition)
  }

  // ── Representatives ───────────────────────────────────────────────────────

  async fn create_representative(
    &self,
    input: NewRepresentative,
  ) -> Result<Representative> {
    input.validate()?;
    let rep = input.into_representative(now());
    let r = rep.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO representatives (
             representative_id, name, title, level, electorate, party, email,
             phone, website, profile_image_url, biography, created_at,
             updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          params![
            encode_uuid(r.representative_id),
            r.name,
            r.title,
            encode_choice(r.level),
            r.electorate,
            r.party,
            r.email,
            r.phone,
            r.website,
            r.profile_image_url,
            r.biography,
            encode_dt(r.created_at),
            encode_dt(r.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(rep)
  }

  async fn list_representatives(
    &self,
    level: Option<GovernmentLevel>,
  ) -> Result<Vec<Representative>> {
    let level = level.map(encode_choice);
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {REPRESENTATIVE_COLUMNS} FROM representatives
             WHERE ?1 IS NULL OR level = ?1
             ORDER BY name, rowid"
          ),
          params![level],
          RawRepresentative::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawRepresentative::into_representative)
  }

  // ── News ──────────────────────────────────────────────────────────────────

  async fn create_news_article(
    &self,
    input: NewNewsArticle,
  ) -> Result<NewsArticle> {
    input.validate()?;
    let article = input.into_article(now());
    let row = article.clone();
    self
      .conn
      .call(move |conn| Ok(insert_article_tx(conn, &row)))
      .await??;
    Ok(article)
  }

  async fn list_news(
    &self,
    category: Option<String>,
    limit: Option<usize>,
  ) -> Result<Vec<NewsArticle>> {
    let limit = sql_limit(limit.unwrap_or(if category.is_some() {
      store::DEFAULT_NEWS_CATEGORY_LIMIT
    } else {
      store::DEFAULT_NEWS_LIMIT
    }));
    let rows = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {NEWS_COLUMNS} FROM news_articles
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY published_at DESC, rowid DESC
             LIMIT ?2"
          ),
          params![category, limit],
          RawNewsArticle::from_row,
        )?)
      })
      .await?;
    decode_all(rows, RawNewsArticle::into_article)
  }

  // ── Vote ledger ───────────────────────────────────────────────────────────

  async fn record_vote(
    &self,
    post_id: Uuid,
    user_id: String,
    vote_type: VoteType,
  ) -> Result<Post> {
    self
      .conn
      .call(move |conn| Ok(record_vote_tx(conn, post_id, &user_id, vote_type)))
      .await?
  }

  async fn get_vote(
    &self,
    post_id: Uuid,
    user_id: String,
  ) -> Result<Option<PostVote>> {
    let post_id = encode_uuid(post_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VOTE_COLUMNS} FROM post_votes
                 WHERE post_id = ?1 AND user_id = ?2"
              ),
              params![post_id, user_id],
              RawVote::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawVote::into_vote).transpose()
  }

  // ── Signature ledger ──────────────────────────────────────────────────────

  async fn sign_petition(
    &self,
    petition_id: Uuid,
    user_id: String,
    comment: Option<String>,
  ) -> Result<Petition> {
    self
      .conn
      .call(move |conn| Ok(sign_petition_tx(conn, petition_id, user_id, comment)))
      .await?
  }

  async fn list_signatures(
    &self,
    petition_id: Uuid,
  ) -> Result<Vec<PetitionSignature>> {
    let id = encode_uuid(petition_id);
    let rows = self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM petitions WHERE petition_id = ?1", &id)? {
          return Ok(None);
        }
        Ok(Some(query_all(
          conn,
          &format!(
            "SELECT {SIGNATURE_COLUMNS} FROM petition_signatures
             WHERE petition_id = ?1
             ORDER BY created_at, rowid"
          ),
          [id],
          RawSignature::from_row,
        )?))
      })
      .await?
      .ok_or(CoreError::NotFound(EntityKind::Petition, petition_id))?;
    decode_all(rows, RawSignature::into_signature)
  }

  // ── Attendance ledger ─────────────────────────────────────────────────────

  async fn set_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
    status: AttendanceStatus,
  ) -> Result<Event> {
    self
      .conn
      .call(move |conn| Ok(set_attendance_tx(conn, event_id, &user_id, status)))
      .await?
  }

  async fn get_attendance(
    &self,
    event_id: Uuid,
    user_id: String,
  ) -> Result<Option<EventAttendee>> {
    let event_id = encode_uuid(event_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ATTENDEE_COLUMNS} FROM event_attendees
                 WHERE event_id = ?1 AND user_id = ?2"
              ),
              params![event_id, user_id],
              RawAttendee::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawAttendee::into_attendee).transpose()
  }

  async fn list_attendees(&self, event_id: Uuid) -> Result<Vec<EventAttendee>> {
    let id = encode_uuid(event_id);
    let rows = self
      .conn
      .call(move |conn| {
        if !exists(conn, "SELECT 1 FROM events WHERE event_id = ?1", &id)? {
          return Ok(None);
        }
        Ok(Some(query_all(
          conn,
          &format!(
            "SELECT {ATTENDEE_COLUMNS} FROM event_attendees
             WHERE event_id = ?1
             ORDER BY created_at, rowid"
          ),
          [id],
          RawAttendee::from_row,
        )?))
      })
      .await?
      .ok_or(CoreError::NotFound(EntityKind::Event, event_id))?;
    decode_all(rows, RawAttendee::into_attendee)
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  async fn summary(&self) -> Result<ActivitySummary> {
    let summary = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM users),
             (SELECT COUNT(*) FROM forums),
             (SELECT COUNT(*) FROM posts),
             (SELECT COUNT(*) FROM events),
             (SELECT COUNT(*) FROM petitions),
             (SELECT COUNT(*) FROM petition_signatures),
             (SELECT COUNT(*) FROM event_attendees WHERE status = 'attending'),
             (SELECT COUNT(*) FROM post_votes)",
          [],
          |r| {
            Ok(ActivitySummary {
              total_users:      r.get(0)?,
              total_forums:     r.get(1)?,
              total_posts:      r.get(2)?,
              total_events:     r.get(3)?,
              total_petitions:  r.get(4)?,
              total_signatures: r.get(5)?,
              total_attendees:  r.get(6)?,
              total_votes:      r.get(7)?,
            })
          },
        )?)
      })
      .await?;
    Ok(summary)
  }
}
