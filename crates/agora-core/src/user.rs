//! Users, identities issued by the authentication provider.
//!
//! Agora never creates user ids itself. A user record is upserted whenever the
//! provider vouches for a caller, keyed by the provider's subject string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  /// Opaque subject id from the authentication provider.
  pub id:                String,
  pub email:             Option<String>,
  pub first_name:        Option<String>,
  pub last_name:         Option<String>,
  pub profile_image_url: Option<String>,
  pub location:          Option<String>,
  pub bio:               Option<String>,
  pub interests:         Vec<String>,
  pub last_active:       Option<DateTime<Utc>>,
  /// Preserved across upserts.
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::store::CivicStore::upsert_user`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertUser {
  pub id:                String,
  pub email:             Option<String>,
  pub first_name:        Option<String>,
  pub last_name:         Option<String>,
  pub profile_image_url: Option<String>,
  pub location:          Option<String>,
  pub bio:               Option<String>,
  #[serde(default)]
  pub interests:         Vec<String>,
}

impl UpsertUser {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into(), ..Self::default() }
  }

  pub fn validate(&self) -> crate::Result<()> {
    crate::error::require_text("user id", &self.id)
  }

  /// Build the stored record, keeping `created_at` from `existing` if any.
  pub fn into_user(self, existing: Option<&User>, now: DateTime<Utc>) -> User {
    User {
      id:                self.id,
      email:             self.email,
      first_name:        self.first_name,
      last_name:         self.last_name,
      profile_image_url: self.profile_image_url,
      location:          self.location,
      bio:               self.bio,
      interests:         self.interests,
      last_active:       Some(now),
      created_at:        existing.map_or(now, |u| u.created_at),
      updated_at:        now,
    }
  }
}
