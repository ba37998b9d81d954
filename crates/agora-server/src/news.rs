//! Periodic headline ingestion from NewsAPI.
//!
//! Each run fetches the configured feeds and stores every usable headline as
//! a [`NewsArticle`](agora_core::news::NewsArticle). Articles already present
//! (same url) are skipped quietly.

use std::{sync::Arc, time::Duration};

use agora_core::{
  Error as DomainError,
  news::NewNewsArticle,
  store::{CivicStore, StoreError},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::time::MissedTickBehavior;

use crate::error::Error;

/// Publisher name used when NewsAPI omits one.
const UNKNOWN_SOURCE: &str = "Unknown";
const LOCATION: &str = "United States";

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
  /// Ingestion is disabled when unset.
  pub api_key:       Option<String>,
  #[serde(default = "default_base_url")]
  pub base_url:      String,
  #[serde(default = "default_interval")]
  pub interval_secs: u64,
}

impl Default for NewsConfig {
  fn default() -> Self {
    Self {
      api_key:       None,
      base_url:      default_base_url(),
      interval_secs: default_interval(),
    }
  }
}

fn default_base_url() -> String { "https://newsapi.org/v2".to_string() }
fn default_interval() -> u64 { 30 * 60 }

/// A `top-headlines` query and the category its results are filed under.
pub struct Feed {
  pub category:  &'static str,
  pub page_size: u32,
}

pub const FEEDS: &[Feed] = &[
  Feed { category: "general", page_size: 10 },
  Feed { category: "politics", page_size: 5 },
];

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TopHeadlines {
  pub status:   String,
  #[serde(default)]
  pub articles: Vec<ApiArticle>,
  pub code:     Option<String>,
  pub message:  Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
  pub source:       Option<ApiSource>,
  pub author:       Option<String>,
  pub title:        Option<String>,
  pub description:  Option<String>,
  pub url:          Option<String>,
  pub url_to_image: Option<String>,
  /// Parsed per item so one bad timestamp only drops that headline.
  pub published_at: Option<String>,
  pub content:      Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSource {
  pub name: Option<String>,
}

/// Map a headline to a new article. Headlines without a title, url, or
/// RFC 3339 publication time are unusable and yield `None`.
pub fn to_new_article(item: ApiArticle, category: &str) -> Option<NewNewsArticle> {
  let title = item.title.filter(|t| !t.trim().is_empty())?;
  let url = item.url.filter(|u| !u.trim().is_empty())?;
  let published_at = item
    .published_at
    .as_deref()
    .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())?
    .with_timezone(&Utc);

  let source = item
    .source
    .and_then(|s| s.name)
    .filter(|n| !n.trim().is_empty())
    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

  Some(NewNewsArticle {
    title,
    content: item.content.or_else(|| item.description.clone()),
    summary: item.description,
    author: item.author,
    source,
    url,
    image_url: item.url_to_image,
    category: Some(category.to_string()),
    location: Some(LOCATION.to_string()),
    published_at,
  })
}

// ─── Storing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
  pub stored:  usize,
  /// Unusable headlines and urls already in the store.
  pub skipped: usize,
  pub failed:  usize,
}

/// Store every usable headline, counting duplicates as skipped.
pub async fn store_articles<S: CivicStore>(
  store: &S,
  items: Vec<ApiArticle>,
  category: &str,
) -> IngestReport {
  let mut report = IngestReport::default();
  for item in items {
    let Some(input) = to_new_article(item, category) else {
      report.skipped += 1;
      continue;
    };
    let url = input.url.clone();
    match store.create_news_article(input).await {
      Ok(_) => report.stored += 1,
      Err(e) if matches!(e.domain(), Some(DomainError::DuplicateArticle(_))) => {
        report.skipped += 1;
      }
      Err(e) => {
        tracing::warn!(%url, error = %e, "failed to store article");
        report.failed += 1;
      }
    }
  }
  report
}

// ─── Job ──────────────────────────────────────────────────────────────────────

pub struct NewsIngest<S> {
  store:    Arc<S>,
  client:   reqwest::Client,
  api_key:  String,
  base_url: String,
  interval: Duration,
}

impl<S: CivicStore + 'static> NewsIngest<S> {
  /// Returns `Ok(None)` when no api key is configured.
  pub fn new(store: Arc<S>, config: &NewsConfig) -> Result<Option<Self>, Error> {
    let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
      return Ok(None);
    };
    let client = reqwest::Client::builder()
      .user_agent(concat!("agora/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Some(Self {
      store,
      client,
      api_key,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      interval: Duration::from_secs(config.interval_secs.max(60)),
    }))
  }

  async fn fetch(&self, feed: &Feed) -> Result<Vec<ApiArticle>, Error> {
    let page_size = feed.page_size.to_string();
    let body: TopHeadlines = self
      .client
      .get(format!("{}/top-headlines", self.base_url))
      .query(&[
        ("country", "us"),
        ("category", feed.category),
        ("pageSize", page_size.as_str()),
        ("apiKey", self.api_key.as_str()),
      ])
      .send()
      .await?
      .json()
      .await?;

    if body.status != "ok" {
      return Err(Error::NewsApi {
        code:    body.code.unwrap_or_else(|| body.status.clone()),
        message: body.message.unwrap_or_default(),
      });
    }
    Ok(body.articles)
  }

  /// Fetch and store every feed once. A failing feed doesn't stop the others.
  pub async fn ingest_once(&self) -> IngestReport {
    let mut total = IngestReport::default();
    for feed in FEEDS {
      match self.fetch(feed).await {
        Ok(items) => {
          let report = store_articles(&*self.store, items, feed.category).await;
          total.stored += report.stored;
          total.skipped += report.skipped;
          total.failed += report.failed;
        }
        Err(e) => {
          tracing::warn!(category = feed.category, error = %e, "news fetch failed");
        }
      }
    }
    tracing::info!(
      stored = total.stored,
      skipped = total.skipped,
      failed = total.failed,
      "news ingestion finished"
    );
    total
  }

  /// Run forever, ingesting immediately and then once per interval.
  pub async fn run(self) {
    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      self.ingest_once().await;
    }
  }
}
