//! Handler for `/auth/user`.

use std::sync::Arc;

use agora_core::{store::CivicStore, user::User};
use axum::extract::State;

use crate::{Caller, error::ApiError, extract::Json};

/// `GET /auth/user` returns the caller's own user record.
pub async fn me<S: CivicStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
) -> Result<Json<User>, ApiError> {
  let user = store
    .get_user(caller.user_id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {} not found", caller.user_id)))?;
  Ok(Json(user))
}
