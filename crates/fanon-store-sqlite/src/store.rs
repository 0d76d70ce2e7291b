//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use fanon_core::{
  Error, Result,
  assoc::Association,
  character::{Character, NewCharacter},
  comment::{Comment, CommentParent, CommentView, NewComment},
  lore::{Approval, LoreEntry, NewLoreEntry},
  profile::{NewProfile, Profile, UserRef},
  relationship::{NewRelationship, Relationship},
  series::{NewSeries, Series},
  store::{CharacterListing, ContentStore, LoreFilter, LoreListing, TheoryListing},
  theory::{FanTheory, NewFanTheory, Vote, VoteReceipt},
  timeline::{NewTimeline, NewTimelineEvent, Timeline, TimelineEvent, TimelineEventView},
};

use crate::{
  encode::{
    RawCharacter, RawComment, RawLoreEntry, RawProfile, RawRelationship,
    RawTheory, RawTimeline, RawTimelineEvent, RawVote, encode_dt,
    encode_sources, encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists ────────────────────────────────────────────────────────────
// Kept next to the row mappers below; the order must match.

const PROFILE_COLS: &str =
  "user_id, username, avatar_url, bio, role, created_at";
const SERIES_COLS: &str =
  "id, name, description, start_year, end_year, color_code";
const CHARACTER_COLS: &str = "id, name, alias, portrait_url, sprite_url, \
   description, first_appearance, series_id, is_robot_master, is_maverick, \
   is_human, is_reploid, created_by, created_at";
const RELATIONSHIP_COLS: &str =
  "id, source_id, target_id, relationship_type, description, created_at";
const LORE_COLS: &str = "id, title, content, series_id, tags, sources, \
   creator_id, is_approved, created_at, updated_at";
const THEORY_COLS: &str = "id, title, description, branching_point, \
   alternate_timeline, creator_id, is_approved, upvotes, created_at, \
   updated_at";
const COMMENT_COLS: &str =
  "id, content, user_id, lore_entry_id, fan_theory_id, created_at";
const TIMELINE_COLS: &str =
  "id, title, description, is_official, creator_id, created_at, updated_at";
const EVENT_COLS: &str = "id, timeline_id, title, description, year, \
   series_id, importance, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fanon content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::store)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::store)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::store)
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn upsert_profile(&self, input: NewProfile) -> Result<Profile> {
    let id_str = encode_uuid(input.user_id);
    let now_str = encode_dt(Utc::now());

    let raw: RawProfile = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (user_id, username, avatar_url, bio, role, created_at)
           VALUES (?1, ?2, ?3, ?4, 'user', ?5)
           ON CONFLICT(user_id) DO UPDATE SET
             username   = excluded.username,
             avatar_url = excluded.avatar_url,
             bio        = excluded.bio",
          rusqlite::params![
            id_str,
            input.username,
            input.avatar_url,
            input.bio,
            now_str,
          ],
        )?;

        let raw = conn.query_row(
          &format!("SELECT {PROFILE_COLS} FROM profiles WHERE user_id = ?1"),
          rusqlite::params![id_str],
          profile_from_row,
        )?;
        Ok(raw)
      })
      .await
      .map_err(Error::store)?;

    raw.into_profile()
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLS} FROM profiles WHERE user_id = ?1"),
              rusqlite::params![id_str],
              profile_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawProfile::into_profile).transpose()
  }

  // ── Series ────────────────────────────────────────────────────────────────

  async fn add_series(&self, input: NewSeries) -> Result<Series> {
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO series (name, description, start_year, end_year, color_code)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            row.name,
            row.description,
            row.start_year,
            row.end_year,
            row.color_code,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Series {
      id,
      name:        input.name,
      description: input.description,
      start_year:  input.start_year,
      end_year:    input.end_year,
      color_code:  input.color_code,
    })
  }

  async fn get_series(&self, id: i64) -> Result<Option<Series>> {
    self
      .conn
      .call(move |conn| Ok(load_series(conn, id)?))
      .await
      .map_err(Error::store)
  }

  async fn list_series(&self) -> Result<Vec<Series>> {
    self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {SERIES_COLS} FROM series ORDER BY id"))?;
        let rows = stmt
          .query_map([], series_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::store)
  }

  // ── Characters ────────────────────────────────────────────────────────────

  async fn add_character(&self, input: NewCharacter) -> Result<Character> {
    if self.get_series(input.series_id).await?.is_none() {
      return Err(Error::SeriesNotFound(input.series_id));
    }

    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let created_by_str = input.created_by.map(encode_uuid);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO characters (
             name, alias, portrait_url, sprite_url, description,
             first_appearance, series_id, is_robot_master, is_maverick,
             is_human, is_reploid, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            row.name,
            row.alias,
            row.portrait_url,
            row.sprite_url,
            row.description,
            row.first_appearance,
            row.series_id,
            row.flags.is_robot_master,
            row.flags.is_maverick,
            row.flags.is_human,
            row.flags.is_reploid,
            created_by_str,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Character {
      id,
      name:             input.name,
      alias:            input.alias,
      portrait_url:     input.portrait_url,
      sprite_url:       input.sprite_url,
      description:      input.description,
      first_appearance: input.first_appearance,
      series_id:        input.series_id,
      flags:            input.flags,
      created_by:       input.created_by,
      created_at,
    })
  }

  async fn get_character(&self, id: i64) -> Result<Option<Character>> {
    let raw: Option<RawCharacter> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CHARACTER_COLS} FROM characters WHERE id = ?1"),
              rusqlite::params![id],
              character_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawCharacter::into_character).transpose()
  }

  async fn get_characters(&self, ids: Vec<i64>) -> Result<Vec<Character>> {
    let raws: Vec<RawCharacter> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHARACTER_COLS} FROM characters WHERE id = ?1"
        ))?;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(raw) = stmt
            .query_row(rusqlite::params![id], character_from_row)
            .optional()?
          {
            found.push(raw);
          }
        }
        Ok(found)
      })
      .await
      .map_err(Error::store)?;

    raws.into_iter().map(RawCharacter::into_character).collect()
  }

  async fn list_characters(
    &self,
    series_id: Option<i64>,
  ) -> Result<Vec<CharacterListing>> {
    let pairs: Vec<(RawCharacter, Option<Series>)> = self
      .conn
      .call(move |conn| {
        let raws = if let Some(series) = series_id {
          let mut stmt = conn.prepare(&format!(
            "SELECT {CHARACTER_COLS} FROM characters WHERE series_id = ?1 ORDER BY name"
          ))?;
          stmt
            .query_map(rusqlite::params![series], character_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {CHARACTER_COLS} FROM characters ORDER BY name"
          ))?;
          stmt
            .query_map([], character_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut pairs = Vec::with_capacity(raws.len());
        for raw in raws {
          let series = load_series(conn, raw.series_id)?;
          pairs.push((raw, series));
        }
        Ok(pairs)
      })
      .await
      .map_err(Error::store)?;

    pairs
      .into_iter()
      .map(|(raw, series)| {
        Ok(CharacterListing { character: raw.into_character()?, series })
      })
      .collect()
  }

  // ── Relationship edges ────────────────────────────────────────────────────

  async fn insert_relationship(
    &self,
    input: NewRelationship,
  ) -> Result<Relationship> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO relationships
             (source_id, target_id, relationship_type, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            row.source_id,
            row.target_id,
            row.relationship_type,
            row.description,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Relationship {
      id,
      source_id:         input.source_id,
      target_id:         input.target_id,
      relationship_type: input.relationship_type,
      description:       input.description,
      created_at,
    })
  }

  async fn find_relationship(
    &self,
    a: i64,
    b: i64,
    relationship_type: String,
  ) -> Result<Option<Relationship>> {
    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RELATIONSHIP_COLS} FROM relationships
                 WHERE relationship_type = ?3
                   AND ((source_id = ?1 AND target_id = ?2)
                     OR (source_id = ?2 AND target_id = ?1))
                 LIMIT 1"
              ),
              rusqlite::params![a, b, relationship_type],
              relationship_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn delete_relationship(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await
      .map_err(Error::store)?;

    Ok(deleted > 0)
  }

  async fn relationships_touching(
    &self,
    character_id: i64,
  ) -> Result<Vec<Relationship>> {
    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RELATIONSHIP_COLS} FROM relationships
           WHERE source_id = ?1 OR target_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![character_id], relationship_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::store)?;

    raws
      .into_iter()
      .map(RawRelationship::into_relationship)
      .collect()
  }

  // ── Character ↔ lore associations ─────────────────────────────────────────

  async fn find_association(
    &self,
    character_id: i64,
    lore_entry_id: i64,
  ) -> Result<Option<Association>> {
    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id FROM character_lore_entries
               WHERE character_id = ?1 AND lore_entry_id = ?2
               LIMIT 1",
              rusqlite::params![character_id, lore_entry_id],
              |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|id| Association { id, character_id, lore_entry_id }),
        )
      })
      .await
      .map_err(Error::store)
  }

  async fn insert_association(
    &self,
    character_id: i64,
    lore_entry_id: i64,
  ) -> Result<Association> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO character_lore_entries (character_id, lore_entry_id)
           VALUES (?1, ?2)",
          rusqlite::params![character_id, lore_entry_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Association { id, character_id, lore_entry_id })
  }

  async fn characters_for_lore_entry(
    &self,
    lore_entry_id: i64,
  ) -> Result<Vec<CharacterListing>> {
    let pairs: Vec<(RawCharacter, Option<Series>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM characters c
           JOIN character_lore_entries a ON a.character_id = c.id
           WHERE a.lore_entry_id = ?1
           ORDER BY a.id",
          qualified(CHARACTER_COLS, "c")
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![lore_entry_id], character_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut pairs = Vec::with_capacity(raws.len());
        for raw in raws {
          let series = load_series(conn, raw.series_id)?;
          pairs.push((raw, series));
        }
        Ok(pairs)
      })
      .await
      .map_err(Error::store)?;

    pairs
      .into_iter()
      .map(|(raw, series)| {
        Ok(CharacterListing { character: raw.into_character()?, series })
      })
      .collect()
  }

  async fn lore_entries_for_character(
    &self,
    character_id: i64,
  ) -> Result<Vec<LoreListing>> {
    let rows: Vec<(RawLoreEntry, Option<Series>, Option<RawProfile>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM lore_entries l
           JOIN character_lore_entries a ON a.lore_entry_id = l.id
           WHERE a.character_id = ?1
           ORDER BY a.id",
          qualified(LORE_COLS, "l")
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![character_id], lore_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        resolve_lore_rows(conn, raws)
      })
      .await
      .map_err(Error::store)?;

    decode_lore_listings(rows)
  }

  // ── Lore entries ──────────────────────────────────────────────────────────

  async fn add_lore_entry(&self, input: NewLoreEntry) -> Result<LoreEntry> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let tags_str = encode_tags(&input.tags)?;
    let sources_str = encode_sources(&input.sources)?;
    let creator_str = input.creator_id.map(encode_uuid);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lore_entries
             (title, content, series_id, tags, sources, creator_id,
              is_approved, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
          rusqlite::params![
            row.title,
            row.content,
            row.series_id,
            tags_str,
            sources_str,
            creator_str,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(LoreEntry {
      id,
      title:      input.title,
      content:    input.content,
      series_id:  input.series_id,
      tags:       input.tags,
      sources:    input.sources,
      creator_id: input.creator_id,
      approval:   Approval::Pending,
      created_at,
      updated_at: created_at,
    })
  }

  async fn get_lore_entry(&self, id: i64) -> Result<Option<LoreEntry>> {
    let raw: Option<RawLoreEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LORE_COLS} FROM lore_entries WHERE id = ?1"),
              rusqlite::params![id],
              lore_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawLoreEntry::into_lore_entry).transpose()
  }

  async fn list_lore_entries(
    &self,
    filter: LoreFilter,
  ) -> Result<Vec<LoreListing>> {
    let rows: Vec<(RawLoreEntry, Option<Series>, Option<RawProfile>)> = self
      .conn
      .call(move |conn| {
        let raws = if let Some(series) = filter.series_id {
          let mut stmt = conn.prepare(&format!(
            "SELECT {LORE_COLS} FROM lore_entries
             WHERE is_approved = 1 AND series_id = ?1
             ORDER BY created_at DESC, id DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![series], lore_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {LORE_COLS} FROM lore_entries
             WHERE is_approved = 1
             ORDER BY created_at DESC, id DESC"
          ))?;
          stmt
            .query_map([], lore_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        resolve_lore_rows(conn, raws)
      })
      .await
      .map_err(Error::store)?;

    let mut listings = decode_lore_listings(rows)?;
    if let Some(tag) = filter.tag {
      listings.retain(|listing| listing.entry.tags.contains(&tag));
    }
    Ok(listings)
  }

  async fn approve_lore_entry(&self, id: i64) -> Result<()> {
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE lore_entries SET is_approved = 1, updated_at = ?2 WHERE id = ?1",
          rusqlite::params![id, now_str],
        )?)
      })
      .await
      .map_err(Error::store)?;

    if changed == 0 {
      return Err(Error::LoreEntryNotFound(id));
    }
    Ok(())
  }

  // ── Fan theories ──────────────────────────────────────────────────────────

  async fn add_theory(&self, input: NewFanTheory) -> Result<FanTheory> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let creator_str = encode_uuid(input.creator_id);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fan_theories
             (title, description, branching_point, alternate_timeline,
              creator_id, is_approved, upvotes, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)",
          rusqlite::params![
            row.title,
            row.description,
            row.branching_point,
            row.alternate_timeline,
            creator_str,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(FanTheory {
      id,
      title:              input.title,
      description:        input.description,
      branching_point:    input.branching_point,
      alternate_timeline: input.alternate_timeline,
      creator_id:         input.creator_id,
      approval:           Approval::Pending,
      upvotes:            0,
      created_at,
      updated_at:         created_at,
    })
  }

  async fn get_theory(&self, id: i64) -> Result<Option<FanTheory>> {
    let raw: Option<RawTheory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {THEORY_COLS} FROM fan_theories WHERE id = ?1"),
              rusqlite::params![id],
              theory_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawTheory::into_theory).transpose()
  }

  async fn list_theories(&self) -> Result<Vec<TheoryListing>> {
    let rows: Vec<(RawTheory, Option<RawProfile>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {THEORY_COLS} FROM fan_theories
           WHERE is_approved = 1
           ORDER BY upvotes DESC, id"
        ))?;
        let raws = stmt
          .query_map([], theory_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(raws.len());
        for raw in raws {
          let profile = load_profile(conn, &raw.creator_id)?;
          rows.push((raw, profile));
        }
        Ok(rows)
      })
      .await
      .map_err(Error::store)?;

    rows
      .into_iter()
      .map(|(raw, profile)| {
        Ok(TheoryListing {
          theory:  raw.into_theory()?,
          creator: decode_user_ref(profile)?,
        })
      })
      .collect()
  }

  async fn approve_theory(&self, id: i64) -> Result<()> {
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE fan_theories SET is_approved = 1, updated_at = ?2 WHERE id = ?1",
          rusqlite::params![id, now_str],
        )?)
      })
      .await
      .map_err(Error::store)?;

    if changed == 0 {
      return Err(Error::TheoryNotFound(id));
    }
    Ok(())
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn toggle_vote(
    &self,
    user_id: Uuid,
    theory_id: i64,
  ) -> Result<VoteReceipt> {
    let user_str = encode_uuid(user_id);
    let now_str = encode_dt(Utc::now());

    let (upvoted, upvotes) = self
      .conn
      .call(move |conn| {
        // Immediate mode takes the write lock up front, so concurrent
        // toggles on the same pair serialize instead of failing at
        // commit.
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
          .query_row(
            "SELECT id FROM votes WHERE user_id = ?1 AND theory_id = ?2",
            rusqlite::params![user_str, theory_id],
            |row| row.get(0),
          )
          .optional()?;

        let upvoted = match existing {
          Some(vote_id) => {
            tx.execute(
              "DELETE FROM votes WHERE id = ?1",
              rusqlite::params![vote_id],
            )?;
            tx.execute(
              "UPDATE fan_theories SET upvotes = upvotes - 1 WHERE id = ?1",
              rusqlite::params![theory_id],
            )?;
            false
          }
          None => {
            tx.execute(
              "INSERT INTO votes (user_id, theory_id, created_at)
               VALUES (?1, ?2, ?3)",
              rusqlite::params![user_str, theory_id, now_str],
            )?;
            tx.execute(
              "UPDATE fan_theories SET upvotes = upvotes + 1 WHERE id = ?1",
              rusqlite::params![theory_id],
            )?;
            true
          }
        };

        let upvotes: i64 = tx.query_row(
          "SELECT upvotes FROM fan_theories WHERE id = ?1",
          rusqlite::params![theory_id],
          |row| row.get(0),
        )?;

        tx.commit()?;
        Ok((upvoted, upvotes))
      })
      .await
      .map_err(|e| translate_vote_error(e, user_id, theory_id))?;

    Ok(VoteReceipt { upvoted, upvotes })
  }

  async fn find_vote(
    &self,
    user_id: Uuid,
    theory_id: i64,
  ) -> Result<Option<Vote>> {
    let user_str = encode_uuid(user_id);

    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, user_id, theory_id, created_at FROM votes
               WHERE user_id = ?1 AND theory_id = ?2",
              rusqlite::params![user_str, theory_id],
              vote_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn count_votes(&self, theory_id: i64) -> Result<i64> {
    self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM votes WHERE theory_id = ?1",
          rusqlite::params![theory_id],
          |row| row.get(0),
        )?)
      })
      .await
      .map_err(Error::store)
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn insert_comment(&self, input: NewComment) -> Result<Comment> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let user_str = encode_uuid(input.user_id);
    let lore_id = input.parent.lore_entry_id();
    let theory_id = input.parent.fan_theory_id();
    let content = input.content.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments
             (content, user_id, lore_entry_id, fan_theory_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![content, user_str, lore_id, theory_id, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Comment {
      id,
      content: input.content,
      user_id: input.user_id,
      parent: input.parent,
      created_at,
    })
  }

  async fn comments_for(
    &self,
    parent: CommentParent,
  ) -> Result<Vec<CommentView>> {
    let (column, parent_id) = match parent {
      CommentParent::LoreEntry(id) => ("lore_entry_id", id),
      CommentParent::FanTheory(id) => ("fan_theory_id", id),
    };

    let rows: Vec<(RawComment, Option<RawProfile>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLS} FROM comments
           WHERE {column} = ?1
           ORDER BY created_at, id"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![parent_id], comment_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(raws.len());
        for raw in raws {
          let profile = load_profile(conn, &raw.user_id)?;
          rows.push((raw, profile));
        }
        Ok(rows)
      })
      .await
      .map_err(Error::store)?;

    rows
      .into_iter()
      .map(|(raw, profile)| {
        Ok(CommentView {
          comment: raw.into_comment()?,
          user:    decode_user_ref(profile)?,
        })
      })
      .collect()
  }

  // ── Timelines ─────────────────────────────────────────────────────────────

  async fn add_timeline(&self, input: NewTimeline) -> Result<Timeline> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let creator_str = input.creator_id.map(encode_uuid);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO timelines
             (title, description, is_official, creator_id, created_at, updated_at)
           VALUES (?1, ?2, 0, ?3, ?4, ?4)",
          rusqlite::params![row.title, row.description, creator_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(Timeline {
      id,
      title:       input.title,
      description: input.description,
      is_official: false,
      creator_id:  input.creator_id,
      created_at,
      updated_at:  created_at,
    })
  }

  async fn get_timeline(&self, id: i64) -> Result<Option<Timeline>> {
    let raw: Option<RawTimeline> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TIMELINE_COLS} FROM timelines WHERE id = ?1"),
              rusqlite::params![id],
              timeline_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::store)?;

    raw.map(RawTimeline::into_timeline).transpose()
  }

  async fn list_timelines(
    &self,
    is_official: Option<bool>,
  ) -> Result<Vec<Timeline>> {
    let raws: Vec<RawTimeline> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(official) = is_official {
          let mut stmt = conn.prepare(&format!(
            "SELECT {TIMELINE_COLS} FROM timelines WHERE is_official = ?1 ORDER BY id"
          ))?;
          stmt
            .query_map(rusqlite::params![official], timeline_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn
            .prepare(&format!("SELECT {TIMELINE_COLS} FROM timelines ORDER BY id"))?;
          stmt
            .query_map([], timeline_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await
      .map_err(Error::store)?;

    raws.into_iter().map(RawTimeline::into_timeline).collect()
  }

  async fn add_timeline_event(
    &self,
    input: NewTimelineEvent,
  ) -> Result<TimelineEvent> {
    if self.get_timeline(input.timeline_id).await?.is_none() {
      return Err(Error::TimelineNotFound(input.timeline_id));
    }

    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO timeline_events
             (timeline_id, title, description, year, series_id, importance, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.timeline_id,
            row.title,
            row.description,
            row.year,
            row.series_id,
            row.importance,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(Error::store)?;

    Ok(TimelineEvent {
      id,
      timeline_id: input.timeline_id,
      title:       input.title,
      description: input.description,
      year:        input.year,
      series_id:   input.series_id,
      importance:  input.importance,
      created_at,
    })
  }

  async fn events_for_timeline(
    &self,
    timeline_id: i64,
    series_id: Option<i64>,
  ) -> Result<Vec<TimelineEventView>> {
    let rows: Vec<(RawTimelineEvent, Option<Series>)> = self
      .conn
      .call(move |conn| {
        let raws = if let Some(series) = series_id {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM timeline_events
             WHERE timeline_id = ?1 AND series_id = ?2
             ORDER BY year, id"
          ))?;
          stmt
            .query_map(rusqlite::params![timeline_id, series], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM timeline_events
             WHERE timeline_id = ?1
             ORDER BY year, id"
          ))?;
          stmt
            .query_map(rusqlite::params![timeline_id], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut rows = Vec::with_capacity(raws.len());
        for raw in raws {
          let series = match raw.series_id {
            Some(id) => load_series(conn, id)?,
            None => None,
          };
          rows.push((raw, series));
        }
        Ok(rows)
      })
      .await
      .map_err(Error::store)?;

    rows
      .into_iter()
      .map(|(raw, series)| Ok(TimelineEventView { event: raw.into_event()?, series }))
      .collect()
  }
}

// ─── Error translation ───────────────────────────────────────────────────────

/// Map the failure modes of the vote transaction onto the domain
/// taxonomy: a missing counter row means the theory is gone, a UNIQUE
/// violation means a duplicate vote survived a race, a FOREIGN KEY
/// violation means the theory vanished between check and insert.
fn translate_vote_error(
  err: tokio_rusqlite::Error,
  user_id: Uuid,
  theory_id: i64,
) -> Error {
  match &err {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
      Error::TheoryNotFound(theory_id)
    }
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) => {
      match e.extended_code {
        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
          Error::DuplicateVote { user_id, theory_id }
        }
        rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
          Error::TheoryNotFound(theory_id)
        }
        _ => Error::store(err),
      }
    }
    _ => Error::store(err),
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────
// Column order must match the *_COLS constants above.

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    user_id:    row.get(0)?,
    username:   row.get(1)?,
    avatar_url: row.get(2)?,
    bio:        row.get(3)?,
    role:       row.get(4)?,
    created_at: row.get(5)?,
  })
}

fn series_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Series> {
  Ok(Series {
    id:          row.get(0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    start_year:  row.get(3)?,
    end_year:    row.get(4)?,
    color_code:  row.get(5)?,
  })
}

fn character_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCharacter> {
  Ok(RawCharacter {
    id:               row.get(0)?,
    name:             row.get(1)?,
    alias:            row.get(2)?,
    portrait_url:     row.get(3)?,
    sprite_url:       row.get(4)?,
    description:      row.get(5)?,
    first_appearance: row.get(6)?,
    series_id:        row.get(7)?,
    is_robot_master:  row.get(8)?,
    is_maverick:      row.get(9)?,
    is_human:         row.get(10)?,
    is_reploid:       row.get(11)?,
    created_by:       row.get(12)?,
    created_at:       row.get(13)?,
  })
}

fn relationship_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawRelationship> {
  Ok(RawRelationship {
    id:                row.get(0)?,
    source_id:         row.get(1)?,
    target_id:         row.get(2)?,
    relationship_type: row.get(3)?,
    description:       row.get(4)?,
    created_at:        row.get(5)?,
  })
}

fn lore_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLoreEntry> {
  Ok(RawLoreEntry {
    id:          row.get(0)?,
    title:       row.get(1)?,
    content:     row.get(2)?,
    series_id:   row.get(3)?,
    tags:        row.get(4)?,
    sources:     row.get(5)?,
    creator_id:  row.get(6)?,
    is_approved: row.get(7)?,
    created_at:  row.get(8)?,
    updated_at:  row.get(9)?,
  })
}

fn theory_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTheory> {
  Ok(RawTheory {
    id:                 row.get(0)?,
    title:              row.get(1)?,
    description:        row.get(2)?,
    branching_point:    row.get(3)?,
    alternate_timeline: row.get(4)?,
    creator_id:         row.get(5)?,
    is_approved:        row.get(6)?,
    upvotes:            row.get(7)?,
    created_at:         row.get(8)?,
    updated_at:         row.get(9)?,
  })
}

fn vote_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVote> {
  Ok(RawVote {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    theory_id:  row.get(2)?,
    created_at: row.get(3)?,
  })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawComment> {
  Ok(RawComment {
    id:            row.get(0)?,
    content:       row.get(1)?,
    user_id:       row.get(2)?,
    lore_entry_id: row.get(3)?,
    fan_theory_id: row.get(4)?,
    created_at:    row.get(5)?,
  })
}

fn timeline_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTimeline> {
  Ok(RawTimeline {
    id:          row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    is_official: row.get(3)?,
    creator_id:  row.get(4)?,
    created_at:  row.get(5)?,
    updated_at:  row.get(6)?,
  })
}

fn event_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawTimelineEvent> {
  Ok(RawTimelineEvent {
    id:          row.get(0)?,
    timeline_id: row.get(1)?,
    title:       row.get(2)?,
    description: row.get(3)?,
    year:        row.get(4)?,
    series_id:   row.get(5)?,
    importance:  row.get(6)?,
    created_at:  row.get(7)?,
  })
}

// ─── In-connection helpers ───────────────────────────────────────────────────

/// Prefix every column in a `*_COLS` list with a table alias for joins.
fn qualified(cols: &str, alias: &str) -> String {
  cols
    .split(',')
    .map(|col| format!("{alias}.{}", col.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}

fn load_series(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<Series>> {
  conn
    .query_row(
      &format!("SELECT {SERIES_COLS} FROM series WHERE id = ?1"),
      rusqlite::params![id],
      series_from_row,
    )
    .optional()
}

fn load_profile(
  conn: &rusqlite::Connection,
  user_id: &str,
) -> rusqlite::Result<Option<RawProfile>> {
  conn
    .query_row(
      &format!("SELECT {PROFILE_COLS} FROM profiles WHERE user_id = ?1"),
      rusqlite::params![user_id],
      profile_from_row,
    )
    .optional()
}

/// Attach the series and creator rows to each raw lore row.
fn resolve_lore_rows(
  conn: &rusqlite::Connection,
  raws: Vec<RawLoreEntry>,
) -> Result<Vec<(RawLoreEntry, Option<Series>, Option<RawProfile>)>, tokio_rusqlite::Error>
{
  let mut rows = Vec::with_capacity(raws.len());
  for raw in raws {
    let series = match raw.series_id {
      Some(id) => load_series(conn, id)?,
      None => None,
    };
    let creator = match raw.creator_id.as_deref() {
      Some(user_id) => load_profile(conn, user_id)?,
      None => None,
    };
    rows.push((raw, series, creator));
  }
  Ok(rows)
}

fn decode_user_ref(raw: Option<RawProfile>) -> Result<Option<UserRef>> {
  Ok(
    raw
      .map(RawProfile::into_profile)
      .transpose()?
      .map(|profile| UserRef::from_profile(&profile)),
  )
}

fn decode_lore_listings(
  rows: Vec<(RawLoreEntry, Option<Series>, Option<RawProfile>)>,
) -> Result<Vec<LoreListing>> {
  rows
    .into_iter()
    .map(|(raw, series, creator)| {
      Ok(LoreListing {
        entry:   raw.into_lore_entry()?,
        series,
        creator: decode_user_ref(creator)?,
      })
    })
    .collect()
}
