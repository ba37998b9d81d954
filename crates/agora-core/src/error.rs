//! Error types for `agora-core`.

use thiserror::Error;
use uuid::Uuid;

/// The kind of record an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Forum,
  Post,
  Event,
  Petition,
  Representative,
  NewsArticle,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found: {1}")]
  NotFound(EntityKind, Uuid),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("user {user_id:?} has already signed petition {petition_id}")]
  AlreadySigned { petition_id: Uuid, user_id: String },

  #[error("petition {0} is not accepting signatures")]
  PetitionClosed(Uuid),

  #[error("a news article with url {0:?} already exists")]
  DuplicateArticle(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject empty or whitespace-only values for a required text field.
pub fn require_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidArgument(format!("{field} must not be blank")));
  }
  Ok(())
}
