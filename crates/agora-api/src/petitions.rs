//! Handlers for `/petitions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/petitions` | `?active=true`, `?limit=` |
//! | `POST` | `/petitions` | Body: [`CreateBody`]; creator is the caller; returns 201 |
//! | `GET`  | `/petitions/{id}` | 404 if not found |
//! | `POST` | `/petitions/{id}/sign` | Body: `{"comment":"..."}`, may be omitted; 409 if closed or already signed |
//! | `GET`  | `/petitions/{id}/signatures` | Oldest first |

use std::sync::Arc;

use agora_core::{
  ledger::PetitionSignature,
  petition::{NewPetition, Petition},
  store::CivicStore,
};
use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Caller,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active: bool,
  pub limit:  Option<usize>,
}

/// `GET /petitions[?active=true][&limit=<n>]`
pub async fn list<S: CivicStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Petition>>, ApiError> {
  let petitions = store
    .list_petitions(params.active, params.limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(petitions))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:             String,
  pub description:       String,
  #[serde(alias = "targetSignatures")]
  pub target_signatures: u32,
  pub category:          Option<String>,
  #[serde(alias = "externalUrl")]
  pub external_url:      Option<String>,
  pub deadline:          Option<DateTime<Utc>>,
}

/// `POST /petitions`
pub async fn create<S: CivicStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewPetition {
    title:             body.title,
    description:       body.description,
    target_signatures: body.target_signatures,
    creator_id:        caller.user_id,
    category:          body.category,
    external_url:      body.external_url,
    deadline:          body.deadline,
  };
  let petition = store.create_petition(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(petition)))
}

/// `GET /petitions/{id}`
pub async fn get_one<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Petition>, ApiError> {
  let petition = store
    .get_petition(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("petition {id} not found")))?;
  Ok(Json(petition))
}

#[derive(Debug, Default, Deserialize)]
pub struct SignBody {
  pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignResponse {
  pub message:  &'static str,
  pub petition: Petition,
}

/// `POST /petitions/{id}/sign`
pub async fn sign<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  body: Option<Json<SignBody>>,
) -> Result<Json<SignResponse>, ApiError> {
  let comment = body.and_then(|Json(body)| body.comment);
  let petition = store
    .sign_petition(id, caller.user_id, comment)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SignResponse { message: "Petition signed", petition }))
}

/// `GET /petitions/{id}/signatures`
pub async fn signatures<S: CivicStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PetitionSignature>>, ApiError> {
  let rows = store.list_signatures(id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}
