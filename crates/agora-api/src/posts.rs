//! Handlers for `/posts` endpoints and post search.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/posts` | Body: [`CreateBody`]; author is the caller; returns 201 |
//! | `GET`  | `/posts/{id}` | 404 if not found |
//! | `GET`  | `/posts/{id}/replies` | Oldest first |
//! | `POST` | `/posts/{id}/vote` | Body: `{"vote_type":"upvote"\|"downvote"}` |
//! | `GET`  | `/posts/{id}/vote` | The caller's vote, 404 if none |
//! | `GET`  | `/search/posts` | `?q=<text>[&limit=<n>]` |

use std::sync::Arc;

use agora_core::{
  forum::{NewPost, Post},
  ledger::{PostVote, VoteType},
  store::CivicStore,
};
use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(alias = "forumId")]
  pub forum_id:  Uuid,
  pub title:     String,
  pub content:   String,
  /// Set to reply to another post in the same forum.
  #[serde(alias = "parentId")]
  pub parent_id: Option<Uuid>,
  #[serde(default, alias = "isSticky")]
  pub is_sticky: bool,
}

/// `POST /posts`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewPost {
    title:     body.title,
    content:   body.content,
    author_id: caller.user_id,
    forum_id:  body.forum_id,
    parent_id: body.parent_id,
    is_sticky: body.is_sticky,
  };
  let post = store.create_post(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

async fn require_post<S: CivicStore>(store: &S, id: Uuid) -> Result<Post, ApiError> {
  store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))
}

/// `GET /posts/{id}`
pub async fn get_one<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
  Ok(Json(require_post(&*store, id).await?))
}

/// `GET /posts/{id}/replies`
pub async fn replies<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Post>>, ApiError> {
  require_post(&*store, id).await?;
  let replies = store.list_replies(id).await.map_err(ApiError::store)?;
  Ok(Json(replies))
}

// ─── Votes ────────────────────────────────────────────────────────────────────

/// `vote_type` is parsed with [`VoteType::parse`]; unknown values are a 400.
#[derive(Debug, Deserialize)]
pub struct VoteBody {
  #[serde(alias = "voteType")]
  pub vote_type: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
  pub message: &'static str,
  pub post:    Post,
}

/// `POST /posts/{id}/vote`
pub async fn vote<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<VoteBody>,
) -> Result<Json<VoteResponse>, ApiError> {
  let vote_type = VoteType::parse(&body.vote_type)?;
  let post = store
    .record_vote(id, caller.user_id, vote_type)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(VoteResponse { message: "Vote recorded", post }))
}

/// `GET /posts/{id}/vote`
pub async fn my_vote<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<Json<PostVote>, ApiError> {
  let vote = store
    .get_vote(id, caller.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no vote on post {id}")))?;
  Ok(Json(vote))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q:     Option<String>,
  pub limit: Option<usize>,
}

/// `GET /search/posts?q=<text>[&limit=<n>]`
pub async fn search<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Post>>, ApiError> {
  let posts = store
    .search_posts(params.q.unwrap_or_default(), params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(posts))
}
