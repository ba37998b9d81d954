//! HTTP Basic-auth middleware and standalone verifier.
//!
//! Requests without an `Authorization` header pass through anonymously.
//! Valid credentials attach an [`agora_api::Caller`] for the matching
//! account; anything else is answered with `401` before reaching the API.

use std::sync::Arc;

use agora_api::Caller;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::error::Error;

/// A login accepted by this server instance. The username doubles as the
/// user id.
#[derive(Clone, Deserialize)]
pub struct Account {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub email:         Option<String>,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
}

#[derive(Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<Account>,
}

/// Verify credentials from headers.
///
/// Returns `Ok(None)` when no `Authorization` header is present.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<Option<Caller>, Error> {
  let Some(header_val) = headers.get(axum::http::header::AUTHORIZATION) else {
    return Ok(None);
  };
  let header_val = header_val.to_str().map_err(|_| Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let account = config
    .accounts
    .iter()
    .find(|a| a.username == username)
    .ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(Some(Caller::new(username)))
}

/// Middleware for [`axum::middleware::from_fn_with_state`].
pub async fn authenticate(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &config) {
    Ok(Some(caller)) => {
      tracing::debug!(user = %caller.user_id, "authenticated request");
      req.extensions_mut().insert(caller);
      next.run(req).await
    }
    Ok(None) => next.run(req).await,
    Err(e) => {
      tracing::warn!(path = %req.uri().path(), "rejected credentials");
      e.into_response()
    }
  }
}
