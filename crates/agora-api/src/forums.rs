//! Handlers for `/forums` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/forums` | Optional `?kind=location\|topic` |
//! | `POST` | `/forums` | Body: [`NewForum`]; returns 201 |
//! | `GET`  | `/forums/{id}` | 404 if not found |
//! | `GET`  | `/forums/{id}/posts` | Top-level posts, newest first; `?limit=` |

use std::sync::Arc;

use agora_core::{
  forum::{Forum, ForumKind, NewForum, Post},
  store::CivicStore,
};
use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind: Option<ForumKind>,
}

/// `GET /forums[?kind=<kind>]`
pub async fn list<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Forum>>, ApiError> {
  let forums = store.list_forums(params.kind).await.map_err(ApiError::store)?;
  Ok(Json(forums))
}

/// `POST /forums`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  _caller: Caller,
  Json(body): Json<NewForum>,
) -> Result<impl IntoResponse, ApiError> {
  let forum = store.create_forum(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(forum)))
}

/// `GET /forums/{id}`
pub async fn get_one<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Forum>, ApiError> {
  let forum = store
    .get_forum(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("forum {id} not found")))?;
  Ok(Json(forum))
}

#[derive(Debug, Deserialize)]
pub struct PostsParams {
  pub limit: Option<usize>,
}

/// `GET /forums/{id}/posts[?limit=<n>]`
pub async fn posts<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PostsParams>,
) -> Result<Json<Vec<Post>>, ApiError> {
  if store.get_forum(id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound(format!("forum {id} not found")));
  }
  let posts = store
    .list_posts(id, params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(posts))
}
