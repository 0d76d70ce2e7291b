//! SQL schema for the Fanon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS profiles (
    user_id    TEXT PRIMARY KEY,     -- id issued by the identity provider
    username   TEXT NOT NULL UNIQUE,
    avatar_url TEXT,
    bio        TEXT,
    role       TEXT NOT NULL DEFAULT 'user',  -- 'user' | 'moderator' | 'admin'
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS series (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    start_year  TEXT,
    end_year    TEXT,
    color_code  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS characters (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    alias            TEXT,
    portrait_url     TEXT,
    sprite_url       TEXT,
    description      TEXT,
    first_appearance TEXT,
    series_id        INTEGER NOT NULL REFERENCES series(id),
    is_robot_master  INTEGER NOT NULL DEFAULT 0,
    is_maverick      INTEGER NOT NULL DEFAULT 0,
    is_human         INTEGER NOT NULL DEFAULT 0,
    is_reploid       INTEGER NOT NULL DEFAULT 0,
    created_by       TEXT,  -- identity-provider id; no FK, profiles are optional
    created_at       TEXT NOT NULL
);

-- Edges are strictly directional in storage; the per-character view
-- re-orients them at read time.
CREATE TABLE IF NOT EXISTS relationships (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id         INTEGER NOT NULL REFERENCES characters(id),
    target_id         INTEGER NOT NULL REFERENCES characters(id),
    relationship_type TEXT NOT NULL,
    description       TEXT,
    created_at        TEXT NOT NULL,
    CHECK (source_id != target_id)
);

CREATE TABLE IF NOT EXISTS lore_entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    series_id   INTEGER REFERENCES series(id),
    tags        TEXT NOT NULL DEFAULT '[]',  -- JSON array of tag labels
    sources     TEXT NOT NULL DEFAULT '[]',  -- JSON array, order preserved
    creator_id  TEXT,
    is_approved INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- No UNIQUE on the pair; the resolution reads de-duplicate any raced
-- duplicate join row.
CREATE TABLE IF NOT EXISTS character_lore_entries (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    character_id  INTEGER NOT NULL REFERENCES characters(id),
    lore_entry_id INTEGER NOT NULL REFERENCES lore_entries(id)
);

CREATE TABLE IF NOT EXISTS fan_theories (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    title              TEXT NOT NULL,
    description        TEXT NOT NULL,
    branching_point    TEXT NOT NULL,
    alternate_timeline TEXT NOT NULL,
    creator_id         TEXT NOT NULL,
    is_approved        INTEGER NOT NULL DEFAULT 0,
    upvotes            INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- Voting is a toggle. The UNIQUE pair is the backstop behind the
-- transactional toggle; a violation surfaces as a conflict, never as a
-- second row.
CREATE TABLE IF NOT EXISTS votes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL,
    theory_id  INTEGER NOT NULL REFERENCES fan_theories(id),
    created_at TEXT NOT NULL,
    UNIQUE (user_id, theory_id)
);

-- Comments attach to exactly one parent and are never updated.
CREATE TABLE IF NOT EXISTS comments (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    content       TEXT NOT NULL,
    user_id       TEXT NOT NULL,
    lore_entry_id INTEGER REFERENCES lore_entries(id),
    fan_theory_id INTEGER REFERENCES fan_theories(id),
    created_at    TEXT NOT NULL,
    CHECK ((lore_entry_id IS NULL) != (fan_theory_id IS NULL))
);

CREATE TABLE IF NOT EXISTS timelines (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    is_official INTEGER NOT NULL DEFAULT 0,
    creator_id  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS timeline_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    timeline_id INTEGER NOT NULL REFERENCES timelines(id),
    title       TEXT NOT NULL,
    description TEXT,
    year        TEXT NOT NULL,   -- stylised years ('20XX') sort lexically
    series_id   INTEGER REFERENCES series(id),
    importance  INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS relationships_source_idx ON relationships(source_id);
CREATE INDEX IF NOT EXISTS relationships_target_idx ON relationships(target_id);
CREATE INDEX IF NOT EXISTS assoc_character_idx ON character_lore_entries(character_id);
CREATE INDEX IF NOT EXISTS assoc_lore_idx      ON character_lore_entries(lore_entry_id);
CREATE INDEX IF NOT EXISTS lore_series_idx     ON lore_entries(series_id);
CREATE INDEX IF NOT EXISTS votes_theory_idx    ON votes(theory_id);
CREATE INDEX IF NOT EXISTS comments_lore_idx   ON comments(lore_entry_id);
CREATE INDEX IF NOT EXISTS comments_theory_idx ON comments(fan_theory_id);
CREATE INDEX IF NOT EXISTS events_timeline_idx ON timeline_events(timeline_id);

PRAGMA user_version = 1;
";
