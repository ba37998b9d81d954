//! Handler for `GET /analytics/summary`.

use std::sync::Arc;

use agora_core::store::{ActivitySummary, CivicStore};
use axum::extract::State;

use crate::{error::ApiError, extract::Json};

pub async fn summary<S: CivicStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<ActivitySummary>, ApiError> {
  let summary = store.summary().await.map_err(ApiError::store)?;
  Ok(Json(summary))
}
