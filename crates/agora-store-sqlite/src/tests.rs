//! Integration tests for `SqliteStore` against an in-memory database.

use agora_core::{
  EntityKind,
  directory::{GovernmentLevel, NewRepresentative},
  event::{EventQuery, NewEvent},
  forum::{Forum, ForumKind, NewForum, NewPost, Post},
  ledger::{AttendanceStatus, VoteType},
  news::NewNewsArticle,
  petition::{NewPetition, PetitionStatus},
  store::CivicStore,
  user::UpsertUser,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore};

type CoreError = agora_core::Error;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn forum(s: &SqliteStore, name: &str) -> Forum {
  s.create_forum(NewForum::new(name, ForumKind::Topic))
    .await
    .unwrap()
}

async fn post(s: &SqliteStore, forum: &Forum, title: &str) -> Post {
  s.create_post(NewPost::new(forum.forum_id, "author", title, "body"))
    .await
    .unwrap()
}

fn article(url: &str, category: Option<&str>, hours_ago: i64) -> NewNewsArticle {
  NewNewsArticle {
    title:        format!("Story at {url}"),
    summary:      None,
    content:      None,
    author:       None,
    source:       "Gazette".into(),
    url:          url.into(),
    image_url:    None,
    category:     category.map(Into::into),
    location:     Some("United States".into()),
    published_at: Utc::now() - Duration::hours(hours_ago),
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_user_keeps_created_at() {
  let s = store().await;
  let first = s.upsert_user(UpsertUser::new("u1")).await.unwrap();

  let mut update = UpsertUser::new("u1");
  update.first_name = Some("Ada".into());
  update.interests = vec!["transit".into(), "parks".into()];
  let second = s.upsert_user(update).await.unwrap();

  assert_eq!(second.created_at, first.created_at);
  assert_eq!(second.first_name.as_deref(), Some("Ada"));
  assert_eq!(second.interests, ["transit", "parks"]);

  let fetched = s.get_user("u1".into()).await.unwrap().unwrap();
  assert_eq!(fetched, second);
  assert!(s.get_user("nobody".into()).await.unwrap().is_none());
}

// ─── Forums & posts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn created_entities_read_back_unchanged() {
  let s = store().await;
  let f = forum(&s, "Parks").await;
  let p = post(&s, &f, "More benches").await;

  let fetched = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!(fetched, p);

  let fetched = s.get_forum(f.forum_id).await.unwrap().unwrap();
  assert_eq!(fetched.post_count, 1);
  assert_eq!(fetched.name, "Parks");

  // Caller-supplied times carry nanoseconds; stored ones carry micros.
  let start = Utc::now() + Duration::days(1);
  let mut input = NewEvent::new("org", "Cleanup", start);
  input.end_time = Some(start + Duration::hours(2));
  let e = s.create_event(input).await.unwrap();
  assert_eq!(s.get_event(e.event_id).await.unwrap().unwrap(), e);

  let mut input = NewPetition::new("creator", "Parks", "More shade", 10);
  input.deadline = Some(Utc::now() + Duration::days(30));
  let p = s.create_petition(input).await.unwrap();
  assert_eq!(s.get_petition(p.petition_id).await.unwrap().unwrap(), p);

  let a = s
    .create_news_article(article("https://news.test/read-back", None, 1))
    .await
    .unwrap();
  assert_eq!(s.list_news(None, None).await.unwrap(), [a]);

  let r = s
    .create_representative(NewRepresentative::new(
      "Ada Park",
      "Council Member",
      GovernmentLevel::Local,
    ))
    .await
    .unwrap();
  assert_eq!(s.list_representatives(None).await.unwrap(), [r]);
}

#[tokio::test]
async fn forum_with_missing_parent_is_not_found() {
  let s = store().await;
  let mut input = NewForum::new("Orphan", ForumKind::Location);
  input.parent_id = Some(Uuid::new_v4());
  let err = s.create_forum(input).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound(EntityKind::Forum, _))));
  assert!(s.list_forums(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_forums_filters_by_kind_and_sorts_by_name() {
  let s = store().await;
  forum(&s, "Zoning").await;
  forum(&s, "Arts").await;
  s.create_forum(NewForum::new("Springfield", ForumKind::Location))
    .await
    .unwrap();

  let topics = s.list_forums(Some(ForumKind::Topic)).await.unwrap();
  let names: Vec<_> = topics.iter().map(|f| f.name.as_str()).collect();
  assert_eq!(names, ["Arts", "Zoning"]);
  assert_eq!(s.list_forums(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn post_in_missing_forum_is_not_found() {
  let s = store().await;
  let err = s
    .create_post(NewPost::new(Uuid::new_v4(), "a", "Hello", "World"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound(EntityKind::Forum, _))));
}

#[tokio::test]
async fn replies_are_listed_separately() {
  let s = store().await;
  let f = forum(&s, "Transit").await;
  let top = post(&s, &f, "Bus lanes").await;

  let mut reply = NewPost::new(f.forum_id, "b", "Re: Bus lanes", "Yes please");
  reply.parent_id = Some(top.post_id);
  let reply = s.create_post(reply).await.unwrap();

  let posts = s.list_posts(f.forum_id, None).await.unwrap();
  assert_eq!(posts.len(), 1);
  assert_eq!(posts[0].post_id, top.post_id);

  let replies = s.list_replies(top.post_id).await.unwrap();
  assert_eq!(replies.len(), 1);
  assert_eq!(replies[0].post_id, reply.post_id);
}

#[tokio::test]
async fn reply_across_forums_is_rejected() {
  let s = store().await;
  let f = forum(&s, "Transit").await;
  let other = forum(&s, "Housing").await;
  let top = post(&s, &f, "Bus lanes").await;

  let mut reply = NewPost::new(other.forum_id, "b", "Re", "Wrong place");
  reply.parent_id = Some(top.post_id);
  let err = s.create_post(reply).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidArgument(_))));

  let other = s.get_forum(other.forum_id).await.unwrap().unwrap();
  assert_eq!(other.post_count, 0);
}

#[tokio::test]
async fn list_posts_is_newest_first_with_limit() {
  let s = store().await;
  let f = forum(&s, "Budget").await;
  for title in ["one", "two", "three"] {
    post(&s, &f, title).await;
  }

  let posts = s.list_posts(f.forum_id, Some(2)).await.unwrap();
  let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
  assert_eq!(titles, ["three", "two"]);
}

#[tokio::test]
async fn search_is_case_insensitive_on_titles() {
  let s = store().await;
  let f = forum(&s, "Streets").await;
  post(&s, &f, "Pothole on Elm").await;
  post(&s, &f, "Street lights").await;

  let hits = s.search_posts("POTHOLE".into(), None).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].title, "Pothole on Elm");

  let err = s.search_posts("  ".into(), None).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidArgument(_))));
}

// ─── Vote ledger ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_switch_moves_the_count() {
  let s = store().await;
  let f = forum(&s, "Votes").await;
  let p = post(&s, &f, "Poll").await;

  let up = s.record_vote(p.post_id, "a".into(), VoteType::Upvote).await.unwrap();
  assert_eq!((up.upvotes, up.downvotes), (1, 0));

  let both = s.record_vote(p.post_id, "b".into(), VoteType::Downvote).await.unwrap();
  assert_eq!((both.upvotes, both.downvotes), (1, 1));

  let switched = s
    .record_vote(p.post_id, "a".into(), VoteType::Downvote)
    .await
    .unwrap();
  assert_eq!((switched.upvotes, switched.downvotes), (0, 2));

  let stored = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!((stored.upvotes, stored.downvotes), (0, 2));
  assert_eq!(s.summary().await.unwrap().total_votes, 2);
}

#[tokio::test]
async fn repeated_vote_is_a_no_op() {
  let s = store().await;
  let f = forum(&s, "Votes").await;
  let p = post(&s, &f, "Poll").await;

  s.record_vote(p.post_id, "a".into(), VoteType::Upvote).await.unwrap();
  let before = s.get_vote(p.post_id, "a".into()).await.unwrap().unwrap();
  let again = s.record_vote(p.post_id, "a".into(), VoteType::Upvote).await.unwrap();
  let after = s.get_vote(p.post_id, "a".into()).await.unwrap().unwrap();

  assert_eq!((again.upvotes, again.downvotes), (1, 0));
  assert_eq!(before, after);
}

#[tokio::test]
async fn vote_on_missing_post_writes_nothing() {
  let s = store().await;
  let err = s
    .record_vote(Uuid::new_v4(), "a".into(), VoteType::Upvote)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound(EntityKind::Post, _))));
  assert_eq!(s.summary().await.unwrap().total_votes, 0);
}

#[tokio::test]
async fn vote_counters_match_the_ledger_after_mixed_sequence() {
  let s = store().await;
  let f = forum(&s, "Votes").await;
  let posts = [post(&s, &f, "First").await, post(&s, &f, "Second").await];
  let users: Vec<String> = (0..19).map(|n| format!("user-{n}")).collect();

  for i in 0..240usize {
    let target = &posts[i % 2];
    let user = users[i * 7 % users.len()].clone();
    let vote = if (i * i + 3 * i) % 5 < 2 { VoteType::Upvote } else { VoteType::Downvote };
    s.record_vote(target.post_id, user, vote).await.unwrap();
  }

  let mut total = 0;
  for p in &posts {
    let (mut ups, mut downs) = (0, 0);
    for user in &users {
      match s.get_vote(p.post_id, user.clone()).await.unwrap() {
        Some(v) if v.vote_type == VoteType::Upvote => ups += 1,
        Some(_) => downs += 1,
        None => {}
      }
    }
    let stored = s.get_post(p.post_id).await.unwrap().unwrap();
    assert_eq!((stored.upvotes, stored.downvotes), (ups, downs));
    total += ups + downs;
  }
  assert_eq!(s.summary().await.unwrap().total_votes, total);
}

// ─── Signature ledger ────────────────────────────────────────────────────────

#[tokio::test]
async fn five_hundred_signers_make_a_petition_successful() {
  let s = store().await;
  let p = s
    .create_petition(NewPetition::new("creator", "Bike lanes", "Paint them", 500))
    .await
    .unwrap();

  for i in 0..499 {
    let p = s.sign_petition(p.petition_id, format!("user-{i}"), None).await.unwrap();
    assert_eq!(p.status, PetitionStatus::Active);
  }
  let done = s
    .sign_petition(p.petition_id, "user-499".into(), Some("finally".into()))
    .await
    .unwrap();
  assert_eq!(done.current_signatures, 500);
  assert_eq!(done.status, PetitionStatus::Successful);

  let err = s.sign_petition(p.petition_id, "late".into(), None).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::PetitionClosed(_))));

  assert_eq!(s.list_signatures(p.petition_id).await.unwrap().len(), 500);
  let active = s.list_petitions(true, None).await.unwrap();
  assert!(active.is_empty());
}

#[tokio::test]
async fn second_signature_from_same_user_is_rejected() {
  let s = store().await;
  let p = s
    .create_petition(NewPetition::new("creator", "Library", "Longer hours", 10))
    .await
    .unwrap();

  s.sign_petition(p.petition_id, "a".into(), None).await.unwrap();
  let err = s.sign_petition(p.petition_id, "a".into(), None).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadySigned { .. })));

  let p = s.get_petition(p.petition_id).await.unwrap().unwrap();
  assert_eq!(p.current_signatures, 1);
}

#[tokio::test]
async fn concurrent_signers_are_all_counted() {
  let s = store().await;
  let p = s
    .create_petition(NewPetition::new("creator", "Crosswalk", "At 5th", 1000))
    .await
    .unwrap();
  let id = p.petition_id;

  let handles: Vec<_> = (0..50)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.sign_petition(id, format!("user-{i}"), None).await
      })
    })
    .collect();
  for h in handles {
    h.await.unwrap().unwrap();
  }

  let stored = s.get_petition(id).await.unwrap().unwrap();
  assert_eq!(stored.current_signatures, 50);
  assert_eq!(s.summary().await.unwrap().total_signatures, 50);
}

#[tokio::test]
async fn expired_petition_closes_on_sign_attempt() {
  let s = store().await;
  let mut input = NewPetition::new("creator", "Old", "Missed it", 10);
  input.deadline = Some(Utc::now() - Duration::hours(1));
  let p = s.create_petition(input).await.unwrap();

  let err = s.sign_petition(p.petition_id, "a".into(), None).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::PetitionClosed(_))));

  let stored = s.get_petition(p.petition_id).await.unwrap().unwrap();
  assert_eq!(stored.status, PetitionStatus::Closed);
  assert_eq!(stored.current_signatures, 0);
  assert!(s.list_signatures(p.petition_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn signatures_of_missing_petition_are_not_found() {
  let s = store().await;
  let err = s.list_signatures(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::NotFound(EntityKind::Petition, _))
  ));
}

// ─── Attendance ledger ───────────────────────────────────────────────────────

#[tokio::test]
async fn attendee_count_tracks_attending_rows_only() {
  let s = store().await;
  let e = s
    .create_event(NewEvent::new("org", "Town hall", Utc::now() + Duration::days(7)))
    .await
    .unwrap();

  let e1 = s
    .set_attendance(e.event_id, "a".into(), AttendanceStatus::Attending)
    .await
    .unwrap();
  assert_eq!(e1.attendee_count, 1);

  let e2 = s
    .set_attendance(e.event_id, "b".into(), AttendanceStatus::Maybe)
    .await
    .unwrap();
  assert_eq!(e2.attendee_count, 1);

  let e3 = s
    .set_attendance(e.event_id, "a".into(), AttendanceStatus::NotAttending)
    .await
    .unwrap();
  assert_eq!(e3.attendee_count, 0);

  let rows = s.list_attendees(e.event_id).await.unwrap();
  assert_eq!(rows.len(), 2);
  let mine = s.get_attendance(e.event_id, "a".into()).await.unwrap().unwrap();
  assert_eq!(mine.status, AttendanceStatus::NotAttending);
}

#[tokio::test]
async fn attendee_count_matches_the_ledger_after_mixed_sequence() {
  let s = store().await;
  let e = s
    .create_event(NewEvent::new("org", "Budget forum", Utc::now() + Duration::days(5)))
    .await
    .unwrap();
  let statuses = [
    AttendanceStatus::Attending,
    AttendanceStatus::Maybe,
    AttendanceStatus::NotAttending,
  ];

  for i in 0..150usize {
    let user = format!("user-{}", i * 11 % 17);
    let updated = s
      .set_attendance(e.event_id, user, statuses[(i * 5 + i / 3) % 3])
      .await
      .unwrap();

    let rows = s.list_attendees(e.event_id).await.unwrap();
    let attending = rows.iter().filter(|r| r.status.is_attending()).count() as u32;
    assert_eq!(updated.attendee_count, attending, "step {i}");
  }
}

#[tokio::test]
async fn attendance_on_missing_event_is_not_found() {
  let s = store().await;
  let err = s
    .set_attendance(Uuid::new_v4(), "a".into(), AttendanceStatus::Attending)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound(EntityKind::Event, _))));
}

#[tokio::test]
async fn upcoming_events_exclude_the_past() {
  let s = store().await;
  let now = Utc::now();
  s.create_event(NewEvent::new("org", "Yesterday", now - Duration::days(1)))
    .await
    .unwrap();
  s.create_event(NewEvent::new("org", "Next week", now + Duration::days(7)))
    .await
    .unwrap();
  s.create_event(NewEvent::new("org", "Tomorrow", now + Duration::days(1)))
    .await
    .unwrap();

  let upcoming = s
    .list_events(EventQuery { upcoming: true, ..EventQuery::default() })
    .await
    .unwrap();
  let titles: Vec<_> = upcoming.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, ["Tomorrow", "Next week"]);

  let all = s.list_events(EventQuery::default()).await.unwrap();
  assert_eq!(all[0].title, "Next week");
  assert_eq!(all.len(), 3);
}

// ─── Directory & news ────────────────────────────────────────────────────────

#[tokio::test]
async fn representatives_filter_by_level() {
  let s = store().await;
  for (name, level) in [
    ("Mayor Quimby", GovernmentLevel::Local),
    ("Senator Burns", GovernmentLevel::Federal),
    ("Councillor Flanders", GovernmentLevel::Local),
  ] {
    s.create_representative(NewRepresentative::new(name, "Official", level))
      .await
      .unwrap();
  }

  let local = s
    .list_representatives(Some(GovernmentLevel::Local))
    .await
    .unwrap();
  let names: Vec<_> = local.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["Councillor Flanders", "Mayor Quimby"]);
}

#[tokio::test]
async fn duplicate_article_url_is_rejected() {
  let s = store().await;
  s.create_news_article(article("https://news.test/a", None, 1))
    .await
    .unwrap();
  let err = s
    .create_news_article(article("https://news.test/a", Some("politics"), 0))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateArticle(_))));
}

#[tokio::test]
async fn news_is_newest_published_first() {
  let s = store().await;
  s.create_news_article(article("https://news.test/old", Some("politics"), 5))
    .await
    .unwrap();
  s.create_news_article(article("https://news.test/new", Some("politics"), 1))
    .await
    .unwrap();
  s.create_news_article(article("https://news.test/other", None, 0))
    .await
    .unwrap();

  let politics = s.list_news(Some("politics".into()), None).await.unwrap();
  let urls: Vec<_> = politics.iter().map(|a| a.url.as_str()).collect();
  assert_eq!(urls, ["https://news.test/new", "https://news.test/old"]);
  assert_eq!(s.list_news(None, Some(1)).await.unwrap().len(), 1);
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_counts_every_table() {
  let s = store().await;
  s.upsert_user(UpsertUser::new("u1")).await.unwrap();
  let f = forum(&s, "General").await;
  let p = post(&s, &f, "Hi").await;
  s.record_vote(p.post_id, "u1".into(), VoteType::Upvote).await.unwrap();
  let e = s
    .create_event(NewEvent::new("u1", "Picnic", Utc::now() + Duration::days(2)))
    .await
    .unwrap();
  s.set_attendance(e.event_id, "u1".into(), AttendanceStatus::Maybe)
    .await
    .unwrap();

  let summary = s.summary().await.unwrap();
  assert_eq!(summary.total_users, 1);
  assert_eq!(summary.total_forums, 1);
  assert_eq!(summary.total_posts, 1);
  assert_eq!(summary.total_events, 1);
  assert_eq!(summary.total_votes, 1);
  assert_eq!(summary.total_attendees, 0);
  assert_eq!(summary.total_petitions, 0);
}
