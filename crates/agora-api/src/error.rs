//! API error type and [`axum::response::IntoResponse`] implementation.

use agora_core::store::StoreError;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("authentication required")]
  Unauthorized,

  #[error("{0}")]
  Conflict(String),

  /// A path, query or body extractor refused the request.
  #[error("{1}")]
  Rejected(StatusCode, String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error: domain failures keep their meaning, anything
  /// else becomes a 500.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.domain() {
      Some(domain) => Self::from_domain(domain),
      None => Self::Store(Box::new(err)),
    }
  }

  fn from_domain(err: &agora_core::Error) -> Self {
    use agora_core::Error as E;
    let message = err.to_string();
    match err {
      E::NotFound(..) => Self::NotFound(message),
      E::InvalidArgument(_) => Self::BadRequest(message),
      E::Unauthorized => Self::Unauthorized,
      E::AlreadySigned { .. } | E::PetitionClosed(_) | E::DuplicateArticle(_) => {
        Self::Conflict(message)
      }
    }
  }
}

impl From<agora_core::Error> for ApiError {
  fn from(err: agora_core::Error) -> Self { Self::from_domain(&err) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Rejected(status, m) => (*status, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn status(err: agora_core::Error) -> StatusCode {
    ApiError::store(err).into_response().status()
  }

  #[test]
  fn domain_errors_map_to_statuses() {
    use agora_core::{EntityKind, Error as E};
    let id = Uuid::new_v4();
    assert_eq!(status(E::NotFound(EntityKind::Post, id)), StatusCode::NOT_FOUND);
    assert_eq!(status(E::InvalidArgument("x".into())), StatusCode::BAD_REQUEST);
    assert_eq!(status(E::Unauthorized), StatusCode::UNAUTHORIZED);
    assert_eq!(status(E::PetitionClosed(id)), StatusCode::CONFLICT);
    assert_eq!(
      status(E::AlreadySigned { petition_id: id, user_id: "u".into() }),
      StatusCode::CONFLICT
    );
    assert_eq!(status(E::DuplicateArticle("u".into())), StatusCode::CONFLICT);
  }
}
