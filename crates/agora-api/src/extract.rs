//! Extractors whose rejections render as [`ApiError`] JSON bodies.
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query`. `Json` also
//! serves as the response type so handlers import a single name.

use axum::{
  extract::{
    FromRequest, FromRequestParts, OptionalFromRequest, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::request::Parts,
  response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let axum::Json(value) = <axum::Json<T> as FromRequest<S>>::from_request(req, state).await?;
    Ok(Self(value))
  }
}

/// A request without a `Content-Type` header extracts as `None`.
impl<T, S> OptionalFromRequest<S> for Json<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(
    req: Request,
    state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    let value =
      <axum::Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
    Ok(value.map(|axum::Json(v)| Self(v)))
  }
}

impl<T: Serialize> IntoResponse for Json<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let axum::extract::Path(value) =
      axum::extract::Path::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}

pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let axum::extract::Query(value) =
      axum::extract::Query::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Rejected(rejection.status(), rejection.body_text())
  }
}
