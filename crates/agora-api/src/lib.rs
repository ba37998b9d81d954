//! JSON REST API for Agora.
//!
//! Exposes an axum [`Router`] backed by any [`agora_core::store::CivicStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility: protected handlers expect a [`Caller`] in the request
//! extensions.
//!
//! Request bodies accept camelCase aliases for multi-word fields
//! (`voteType`, `targetSignatures`, ...). Responses are snake_case.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", agora_api::api_router(store.clone()))
//! ```

pub mod analytics;
pub mod caller;
pub mod directory;
pub mod error;
pub mod events;
pub mod extract;
pub mod forums;
pub mod news;
pub mod petitions;
pub mod posts;
pub mod users;

use std::sync::Arc;

use agora_core::store::CivicStore;
use axum::{
  Router,
  routing::{get, post},
};

pub use caller::Caller;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CivicStore + 'static,
{
  Router::new()
    .route("/auth/user", get(users::me::<S>))
    // Forums & posts
    .route("/forums", get(forums::list::<S>).post(forums::create::<S>))
    .route("/forums/{id}", get(forums::get_one::<S>))
    .route("/forums/{id}/posts", get(forums::posts::<S>))
    .route("/posts", post(posts::create::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>))
    .route("/posts/{id}/replies", get(posts::replies::<S>))
    .route("/posts/{id}/vote", get(posts::my_vote::<S>).post(posts::vote::<S>))
    .route("/search/posts", get(posts::search::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/{id}", get(events::get_one::<S>))
    .route("/events/{id}/attend", post(events::attend::<S>))
    .route("/events/{id}/attendance", get(events::my_attendance::<S>))
    .route("/events/{id}/attendees", get(events::attendees::<S>))
    // Petitions
    .route("/petitions", get(petitions::list::<S>).post(petitions::create::<S>))
    .route("/petitions/{id}", get(petitions::get_one::<S>))
    .route("/petitions/{id}/sign", post(petitions::sign::<S>))
    .route("/petitions/{id}/signatures", get(petitions::signatures::<S>))
    // Directory, news, analytics
    .route(
      "/representatives",
      get(directory::list::<S>).post(directory::create::<S>),
    )
    .route("/news", get(news::list::<S>).post(news::create::<S>))
    .route("/analytics/summary", get(analytics::summary::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use agora_core::{
    forum::{ForumKind, NewForum, NewPost, Post},
    memory::MemoryStore,
    petition::NewPetition,
    user::UpsertUser,
  };
  use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn app(store: &MemoryStore) -> Router {
    api_router(Arc::new(store.clone()))
  }

  fn request(
    method: Method,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
  ) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = caller {
      builder = builder.extension(Caller::new(user));
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
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
  }

  async fn seeded_post(store: &MemoryStore) -> Post {
    let forum = store
      .create_forum(NewForum::new("Main Street", ForumKind::Location))
      .await
      .unwrap();
    store
      .create_post(NewPost::new(forum.forum_id, "author", "Crosswalk", "Needed"))
      .await
      .unwrap()
  }

  async fn vote(app: &Router, post: &Post, user: &str, kind: &str) -> (StatusCode, Value) {
    send(
      app,
      request(
        Method::POST,
        &format!("/posts/{}/vote", post.post_id),
        Some(user),
        Some(json!({ "vote_type": kind })),
      ),
    )
    .await
  }

  #[tokio::test]
  async fn vote_switching_moves_counters() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;

    let (status, body) = vote(&app, &post, "a", "upvote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Vote recorded");
    assert_eq!(body["post"]["upvotes"], 1);

    vote(&app, &post, "b", "downvote").await;
    let (_, body) = vote(&app, &post, "a", "downvote").await;
    assert_eq!(body["post"]["upvotes"], 0);
    assert_eq!(body["post"]["downvotes"], 2);

    let (status, body) = send(
      &app,
      request(Method::GET, &format!("/posts/{}/vote", post.post_id), Some("a"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vote_type"], "downvote");
  }

  #[tokio::test]
  async fn camel_case_bodies_are_accepted() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;

    let (status, body) = send(
      &app,
      request(
        Method::POST,
        &format!("/posts/{}/vote", post.post_id),
        Some("a"),
        Some(json!({ "voteType": "upvote" })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["upvotes"], 1);

    let (status, body) = send(
      &app,
      request(
        Method::POST,
        "/petitions",
        Some("creator"),
        Some(json!({
          "title": "Crosswalks",
          "description": "Near schools",
          "targetSignatures": 40,
          "externalUrl": "https://petitions.test/crosswalks"
        })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["target_signatures"], 40);
    assert_eq!(body["external_url"], "https://petitions.test/crosswalks");
  }

  #[tokio::test]
  async fn extractor_rejections_have_json_bodies() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;

    let (status, body) =
      send(&app, request(Method::GET, "/posts/not-a-uuid", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
      &app,
      request(
        Method::POST,
        &format!("/posts/{}/vote", post.post_id),
        Some("a"),
        Some(json!({ "vote_type": 5 })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn signing_without_a_body() {
    let store = MemoryStore::new();
    let app = app(&store);
    let petition = store
      .create_petition(NewPetition::new("creator", "Trees", "Plant more", 5))
      .await
      .unwrap();

    let (status, body) = send(
      &app,
      request(
        Method::POST,
        &format!("/petitions/{}/sign", petition.petition_id),
        Some("a"),
        None,
      ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["petition"]["current_signatures"], 1);

    let rows = store.list_signatures(petition.petition_id).await.unwrap();
    assert_eq!(rows[0].comment, None);
  }

  #[tokio::test]
  async fn unknown_vote_type_is_bad_request() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;

    let (status, body) = vote(&app, &post, "a", "sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sideways"));
    assert_eq!(store.summary().await.unwrap().total_votes, 0);
  }

  #[tokio::test]
  async fn anonymous_vote_is_unauthorized() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;

    let (status, _) = send(
      &app,
      request(
        Method::POST,
        &format!("/posts/{}/vote", post.post_id),
        None,
        Some(json!({ "vote_type": "upvote" })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn vote_on_missing_post_is_not_found() {
    let store = MemoryStore::new();
    let app = app(&store);
    let (status, _) = send(
      &app,
      request(
        Method::POST,
        &format!("/posts/{}/vote", uuid::Uuid::new_v4()),
        Some("a"),
        Some(json!({ "vote_type": "upvote" })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn second_signature_conflicts() {
    let store = MemoryStore::new();
    let app = app(&store);
    let petition = store
      .create_petition(NewPetition::new("creator", "Parks", "More shade", 100))
      .await
      .unwrap();
    let uri = format!("/petitions/{}/sign", petition.petition_id);

    let (status, body) = send(
      &app,
      request(Method::POST, &uri, Some("a"), Some(json!({ "comment": "yes" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["petition"]["current_signatures"], 1);

    let (status, _) =
      send(&app, request(Method::POST, &uri, Some("a"), Some(json!({})))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(
      &app,
      request(
        Method::GET,
        &format!("/petitions/{}/signatures", petition.petition_id),
        None,
        None,
      ),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn create_petition_requires_a_positive_target() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, body) = send(
      &app,
      request(
        Method::POST,
        "/petitions",
        Some("creator"),
        Some(json!({
          "title": "Bus shelters",
          "description": "On every route",
          "target_signatures": 250
        })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "active");
    assert_eq!(body["creator_id"], "creator");

    let (status, _) = send(
      &app,
      request(
        Method::POST,
        "/petitions",
        Some("creator"),
        Some(json!({
          "title": "Nothing",
          "description": "Zero",
          "target_signatures": 0
        })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn attendance_defaults_to_attending() {
    let store = MemoryStore::new();
    let app = app(&store);

    let (status, event) = send(
      &app,
      request(
        Method::POST,
        "/events",
        Some("org"),
        Some(json!({
          "title": "Cleanup",
          "start_time": "2099-06-01T10:00:00Z"
        })),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/events/{}/attend", event["event_id"].as_str().unwrap());

    let (_, body) =
      send(&app, request(Method::POST, &uri, Some("a"), Some(json!({})))).await;
    assert_eq!(body["event"]["attendee_count"], 1);

    let (_, body) = send(
      &app,
      request(Method::POST, &uri, Some("a"), Some(json!({ "status": "maybe" }))),
    )
    .await;
    assert_eq!(body["event"]["attendee_count"], 0);

    let (status, _) = send(
      &app,
      request(Method::POST, &uri, Some("a"), Some(json!({ "status": "perhaps" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
      send(&app, request(Method::POST, &uri, Some("b"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["attendee_count"], 1);
  }

  #[tokio::test]
  async fn auth_user_returns_the_caller() {
    let store = MemoryStore::new();
    let app = app(&store);
    store.upsert_user(UpsertUser::new("alice")).await.unwrap();

    let (status, _) = send(&app, request(Method::GET, "/auth/user", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
      send(&app, request(Method::GET, "/auth/user", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "alice");
  }

  #[tokio::test]
  async fn search_requires_text() {
    let store = MemoryStore::new();
    let app = app(&store);
    seeded_post(&store).await;

    let (status, body) =
      send(&app, request(Method::GET, "/search/posts?q=cross", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, request(Method::GET, "/search/posts", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn summary_reflects_the_ledgers() {
    let store = MemoryStore::new();
    let app = app(&store);
    let post = seeded_post(&store).await;
    vote(&app, &post, "a", "upvote").await;

    let (status, body) =
      send(&app, request(Method::GET, "/analytics/summary", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_posts"], 1);
    assert_eq!(body["total_votes"], 1);
  }
}
