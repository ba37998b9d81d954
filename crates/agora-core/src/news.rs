//! News articles, written by editors or by the ingestion job.
//!
//! The article `url` is unique across the store and doubles as the
//! deduplication key when the same headline is fetched twice.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, error::require_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
  pub article_id:   Uuid,
  pub title:        String,
  pub summary:      Option<String>,
  pub content:      Option<String>,
  pub author:       Option<String>,
  /// Publisher name, e.g. "City News".
  pub source:       String,
  pub url:          String,
  pub image_url:    Option<String>,
  pub category:     Option<String>,
  pub location:     Option<String>,
  pub published_at: DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNewsArticle {
  pub title:        String,
  pub summary:      Option<String>,
  pub content:      Option<String>,
  pub author:       Option<String>,
  pub source:       String,
  pub url:          String,
  #[serde(alias = "imageUrl")]
  pub image_url:    Option<String>,
  pub category:     Option<String>,
  pub location:     Option<String>,
  #[serde(alias = "publishedAt")]
  pub published_at: DateTime<Utc>,
}

impl NewNewsArticle {
  pub fn validate(&self) -> Result<()> {
    require_text("article title", &self.title)?;
    require_text("article source", &self.source)?;
    require_text("article url", &self.url)
  }

  pub fn into_article(self, now: DateTime<Utc>) -> NewsArticle {
    NewsArticle {
      article_id:   Uuid::new_v4(),
      title:        self.title,
      summary:      self.summary,
      content:      self.content,
      author:       self.author,
      source:       self.source,
      url:          self.url,
      image_url:    self.image_url,
      category:     self.category,
      location:     self.location,
      published_at: self.published_at.trunc_subsecs(6),
      created_at:   now,
    }
  }
}
