//! The elected-representative directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, error::require_text};

/// Tier of government a representative sits in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GovernmentLevel {
  Federal,
  State,
  Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
  pub representative_id: Uuid,
  pub name:              String,
  pub title:             String,
  pub level:             GovernmentLevel,
  /// District, ward, or constituency served.
  pub electorate:        Option<String>,
  pub party:             Option<String>,
  pub email:             Option<String>,
  pub phone:             Option<String>,
  pub website:           Option<String>,
  pub profile_image_url: Option<String>,
  pub biography:         Option<String>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRepresentative {
  pub name:              String,
  pub title:             String,
  pub level:             GovernmentLevel,
  pub electorate:        Option<String>,
  pub party:             Option<String>,
  pub email:             Option<String>,
  pub phone:             Option<String>,
  pub website:           Option<String>,
  #[serde(alias = "profileImageUrl")]
  pub profile_image_url: Option<String>,
  pub biography:         Option<String>,
}

impl NewRepresentative {
  pub fn new(
    name: impl Into<String>,
    title: impl Into<String>,
    level: GovernmentLevel,
  ) -> Self {
    Self {
      name: name.into(),
      title: title.into(),
      level,
      electorate: None,
      party: None,
      email: None,
      phone: None,
      website: None,
      profile_image_url: None,
      biography: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require_text("representative name", &self.name)?;
    require_text("representative title", &self.title)
  }

  pub fn into_representative(self, now: DateTime<Utc>) -> Representative {
    Representative {
      representative_id: Uuid::new_v4(),
      name:              self.name,
      title:             self.title,
      level:             self.level,
      electorate:        self.electorate,
      party:             self.party,
      email:             self.email,
      phone:             self.phone,
      website:           self.website,
      profile_image_url: self.profile_image_url,
      biography:         self.biography,
      created_at:        now,
      updated_at:        now,
    }
  }
}
