//! Petitions and their signature-driven lifecycle.
//!
//! A petition starts `active`. Reaching its signature target moves it to
//! `successful`; passing its deadline while still active moves it to
//! `closed`. Only active petitions accept signatures.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, error::require_text};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PetitionStatus {
  #[default]
  Active,
  Closed,
  Successful,
}

impl PetitionStatus {
  /// The status once the signature count has reached `current` of `target`.
  pub fn after_signature(self, current: u32, target: u32) -> Self {
    match self {
      Self::Active if current >= target => Self::Successful,
      other => other,
    }
  }
}

/// Whether a petition can take another signature right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
  Open,
  /// Still marked active but past its deadline; should be closed.
  Expired,
  Refused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Petition {
  pub petition_id:        Uuid,
  pub title:              String,
  pub description:        String,
  pub target_signatures:  u32,
  pub current_signatures: u32,
  pub creator_id:         String,
  pub category:           Option<String>,
  /// Link to a mirror of the petition on an external platform.
  pub external_url:       Option<String>,
  pub status:             PetitionStatus,
  pub deadline:           Option<DateTime<Utc>>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Petition {
  pub fn admission(&self, now: DateTime<Utc>) -> Admission {
    match self.status {
      PetitionStatus::Active if self.deadline.is_some_and(|d| d <= now) => {
        Admission::Expired
      }
      PetitionStatus::Active => Admission::Open,
      PetitionStatus::Closed | PetitionStatus::Successful => Admission::Refused,
    }
  }
}

/// Input to [`crate::store::CivicStore::create_petition`]. New petitions are
/// always active with no signatures.
#[derive(Debug, Clone)]
pub struct NewPetition {
  pub title:             String,
  pub description:       String,
  pub target_signatures: u32,
  pub creator_id:        String,
  pub category:          Option<String>,
  pub external_url:      Option<String>,
  pub deadline:          Option<DateTime<Utc>>,
}

impl NewPetition {
  pub fn new(
    creator_id: impl Into<String>,
    title: impl Into<String>,
    description: impl Into<String>,
    target_signatures: u32,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      target_signatures,
      creator_id: creator_id.into(),
      category: None,
      external_url: None,
      deadline: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("petition title", &self.title)?;
    require_text("petition description", &self.description)?;
    require_text("creator id", &self.creator_id)?;
    if self.target_signatures == 0 {
      return Err(Error::InvalidArgument(
        "target_signatures must be at least 1".to_owned(),
      ));
    }
    Ok(())
  }

  pub fn into_petition(self, now: DateTime<Utc>) -> Petition {
    Petition {
      petition_id:        Uuid::new_v4(),
      title:              self.title,
      description:        self.description,
      target_signatures:  self.target_signatures,
      current_signatures: 0,
      creator_id:         self.creator_id,
      category:           self.category,
      external_url:       self.external_url,
      status:             PetitionStatus::Active,
      deadline:           self.deadline.map(|t| t.trunc_subsecs(6)),
      created_at:         now,
      updated_at:         now,
    }
  }
}
