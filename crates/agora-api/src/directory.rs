//! Handlers for `/representatives`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/representatives` | Optional `?level=federal\|state\|local` |
//! | `POST` | `/representatives` | Body: [`NewRepresentative`]; returns 201 |

use std::sync::Arc;

use agora_core::{
  directory::{GovernmentLevel, NewRepresentative, Representative},
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
  pub level: Option<GovernmentLevel>,
}

/// `GET /representatives[?level=<level>]`
pub async fn list<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Representative>>, ApiError> {
  let reps = store
    .list_representatives(params.level)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(reps))
}

/// `POST /representatives`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  _caller: Caller,
  Json(body): Json<NewRepresentative>,
) -> Result<impl IntoResponse, ApiError> {
  let rep = store
    .create_representative(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(rep)))
}
