//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Credentials were supplied but did not match any account.
  #[error("unauthorized")]
  Unauthorized,

  #[error("news request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// NewsAPI answered with `"status": "error"`.
  #[error("news api error ({code}): {message}")]
  NewsApi { code: String, message: String },
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "invalid credentials" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"agora\""),
        );
        res
      }
      other => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": other.to_string() })),
      )
        .into_response(),
    }
  }
}
