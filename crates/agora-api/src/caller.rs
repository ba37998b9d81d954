//! The authenticated caller, as established by an upstream auth layer.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// The user a request acts on behalf of.
///
/// The API never authenticates on its own. Whatever sits in front of it
/// inserts a `Caller` into the request extensions; handlers that take a
/// `Caller` argument reject requests without one as `401`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  pub user_id: String,
}

impl Caller {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self { user_id: user_id.into() }
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Caller>()
      .cloned()
      .ok_or(ApiError::Unauthorized)
  }
}
