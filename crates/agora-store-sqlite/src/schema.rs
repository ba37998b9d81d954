//! SQL schema for the Agora SQLite store.
//!
//! Executed once at connection startup. The version is recorded in
//! `PRAGMA user_version`; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id           TEXT PRIMARY KEY,   -- subject from the auth provider
    email             TEXT UNIQUE,
    first_name        TEXT,
    last_name         TEXT,
    profile_image_url TEXT,
    location          TEXT,
    bio               TEXT,
    interests         TEXT NOT NULL DEFAULT '[]',
    last_active       TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS forums (
    forum_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    kind        TEXT NOT NULL,            -- 'location' | 'topic'
    location    TEXT,
    parent_id   TEXT REFERENCES forums(forum_id),
    tags        TEXT NOT NULL DEFAULT '[]',
    post_count  INTEGER NOT NULL DEFAULT 0,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    author_id  TEXT NOT NULL,
    forum_id   TEXT NOT NULL REFERENCES forums(forum_id),
    parent_id  TEXT REFERENCES posts(post_id),
    upvotes    INTEGER NOT NULL DEFAULT 0,   -- mirrors post_votes
    downvotes  INTEGER NOT NULL DEFAULT 0,   -- mirrors post_votes
    is_sticky  INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id       TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    description    TEXT,
    location       TEXT,
    start_time     TEXT NOT NULL,
    end_time       TEXT,
    organizer_id   TEXT NOT NULL,
    category       TEXT,
    attendee_count INTEGER NOT NULL DEFAULT 0,   -- mirrors event_attendees
    is_virtual     INTEGER NOT NULL DEFAULT 0,
    meeting_url    TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS petitions (
    petition_id        TEXT PRIMARY KEY,
    title              TEXT NOT NULL,
    description        TEXT NOT NULL,
    target_signatures  INTEGER NOT NULL CHECK (target_signatures > 0),
    current_signatures INTEGER NOT NULL DEFAULT 0,   -- mirrors petition_signatures
    creator_id         TEXT NOT NULL,
    category           TEXT,
    external_url       TEXT,
    status             TEXT NOT NULL DEFAULT 'active', -- 'active' | 'closed' | 'successful'
    deadline           TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS representatives (
    representative_id TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    title             TEXT NOT NULL,
    level             TEXT NOT NULL,      -- 'federal' | 'state' | 'local'
    electorate        TEXT,
    party             TEXT,
    email             TEXT,
    phone             TEXT,
    website           TEXT,
    profile_image_url TEXT,
    biography         TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS news_articles (
    article_id   TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    summary      TEXT,
    content      TEXT,
    author       TEXT,
    source       TEXT NOT NULL,
    url          TEXT NOT NULL UNIQUE,
    image_url    TEXT,
    category     TEXT,
    location     TEXT,
    published_at TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

-- Ledgers: one row per (entity, user). Rows are never deleted.
CREATE TABLE IF NOT EXISTS post_votes (
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    user_id    TEXT NOT NULL,
    vote_type  TEXT NOT NULL CHECK (vote_type IN ('upvote', 'downvote')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (post_id, user_id)
);

CREATE TABLE IF NOT EXISTS event_attendees (
    event_id   TEXT NOT NULL REFERENCES events(event_id),
    user_id    TEXT NOT NULL,
    status     TEXT NOT NULL CHECK (status IN ('attending', 'maybe', 'not_attending')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (event_id, user_id)
);

CREATE TABLE IF NOT EXISTS petition_signatures (
    petition_id TEXT NOT NULL REFERENCES petitions(petition_id),
    user_id     TEXT NOT NULL,
    comment     TEXT,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (petition_id, user_id)
);

CREATE INDEX IF NOT EXISTS posts_forum_idx        ON posts(forum_id, created_at);
CREATE INDEX IF NOT EXISTS posts_parent_idx       ON posts(parent_id);
CREATE INDEX IF NOT EXISTS events_start_idx       ON events(start_time);
CREATE INDEX IF NOT EXISTS events_category_idx    ON events(category);
CREATE INDEX IF NOT EXISTS petitions_status_idx   ON petitions(status, created_at);
CREATE INDEX IF NOT EXISTS news_published_idx     ON news_articles(published_at);
CREATE INDEX IF NOT EXISTS attendees_status_idx   ON event_attendees(event_id, status);

PRAGMA user_version = 1;
";
