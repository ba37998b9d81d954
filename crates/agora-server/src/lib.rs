//! HTTP server for Agora.
//!
//! Mounts the JSON API under `/api` behind Basic authentication, and runs the
//! optional news ingestion job.

pub mod auth;
pub mod error;
pub mod news;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use agora_core::{store::CivicStore, user::UpsertUser};
use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{Account, AuthConfig, authenticate};
use news::NewsConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `AGORA_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<Account>,
  #[serde(default)]
  pub news:       NewsConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_store_path() -> PathBuf { PathBuf::from("agora.db") }

// ─── Application state ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState<S: CivicStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server [`Router`]: the API under `/api`, with credentials
/// checked on every request.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CivicStore + 'static,
{
  Router::new()
    .nest("/api", agora_api::api_router(state.store))
    .layer(middleware::from_fn_with_state(state.auth, authenticate))
    .layer(TraceLayer::new_for_http())
}

/// Upsert a user record for every configured account so that `/api/auth/user`
/// and authored content resolve to a profile.
pub async fn register_accounts<S: CivicStore>(
  store: &S,
  accounts: &[Account],
) -> Result<(), S::Error> {
  for account in accounts {
    let input = UpsertUser {
      email: account.email.clone(),
      first_name: account.first_name.clone(),
      last_name: account.last_name.clone(),
      ..UpsertUser::new(account.username.clone())
    };
    store.upsert_user(input).await?;
    tracing::debug!(user = %account.username, "registered account");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use agora_store_sqlite::SqliteStore;
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode, header},
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn account(username: &str, password: &str) -> Account {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    Account {
      username:      username.to_string(),
      password_hash: hash,
      email:         Some(format!("{username}@example.com")),
      first_name:    Some("Test".to_string()),
      last_name:     None,
    }
  }

  async fn setup() -> (SqliteStore, Router) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let accounts = vec![account("alice", "secret")];
    register_accounts(&store, &accounts).await.unwrap();
    let state = AppState {
      store: Arc::new(store.clone()),
      auth:  Arc::new(AuthConfig { accounts }),
    };
    (store, router(state))
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  fn request(
    method: Method,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
  ) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = auth {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    }
  }

  async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  #[tokio::test]
  async fn anonymous_reads_are_allowed() {
    let (_, app) = setup().await;
    let (status, body) = send(&app, request(Method::GET, "/api/petitions", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn wrong_password_is_challenged() {
    let (_, app) = setup().await;
    let resp = app
      .clone()
      .oneshot(request(
        Method::GET,
        "/api/petitions",
        Some(basic("alice", "nope")),
        None,
      ))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      resp.headers().get(header::WWW_AUTHENTICATE),
      Some(&HeaderValue::from_static("Basic realm=\"agora\""))
    );
  }

  #[tokio::test]
  async fn anonymous_writes_are_unauthorized() {
    let (_, app) = setup().await;
    let (status, _) = send(
      &app,
      request(
        Method::POST,
        "/api/petitions",
        None,
        Some(json!({ "title": "T", "description": "D", "target_signatures": 10 })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_petition_is_created_by_the_caller() {
    let (store, app) = setup().await;
    let (status, body) = send(
      &app,
      request(
        Method::POST,
        "/api/petitions",
        Some(basic("alice", "secret")),
        Some(json!({
          "title": "Library hours",
          "description": "Open on Sundays",
          "target_signatures": 10
        })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["creator_id"], "alice");

    let listed = store.list_petitions(true, None).await.unwrap();
    assert_eq!(listed.len(), 1);
  }

  #[tokio::test]
  async fn registered_account_has_a_profile() {
    let (_, app) = setup().await;
    let (status, body) = send(
      &app,
      request(Method::GET, "/api/auth/user", Some(basic("alice", "secret")), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");
    assert_eq!(body["email"], "alice@example.com");
  }

  #[test]
  fn config_defaults() {
    let cfg: ServerConfig = serde_json::from_value(json!({})).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 5000);
    assert!(cfg.accounts.is_empty());
    assert!(cfg.news.api_key.is_none());
    assert_eq!(cfg.news.interval_secs, 1800);
  }
}
