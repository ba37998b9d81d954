//! Handlers for `/news`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/news` | `?category=`, `?limit=`; newest first |
//! | `POST` | `/news` | Body: [`NewNewsArticle`]; 409 on a duplicate url |

use std::sync::Arc;

use agora_core::{
  news::{NewNewsArticle, NewsArticle},
  store::CivicStore,
};
use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{
  Caller,
  error::ApiError,
  extract::{Json, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
  pub limit:    Option<usize>,
}

/// `GET /news[?category=...][&limit=<n>]`
pub async fn list<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
  let articles = store
    .list_news(params.category, params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(articles))
}

/// `POST /news`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  _caller: Caller,
  Json(body): Json<NewNewsArticle>,
) -> Result<impl IntoResponse, ApiError> {
  let article = store
    .create_news_article(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(article)))
}
