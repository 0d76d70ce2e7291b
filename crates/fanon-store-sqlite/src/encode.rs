//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Tag and source lists
//! are stored as compact JSON arrays. UUIDs are stored as hyphenated
//! lowercase strings. Booleans and flags are INTEGER 0/1, which rusqlite
//! maps to `bool` directly.

use chrono::{DateTime, Utc};
use fanon_core::{
  Error, Result,
  character::{Character, ClassFlags},
  comment::{Comment, CommentParent},
  lore::{Approval, LoreEntry, LoreTag},
  profile::{Profile, Role},
  relationship::Relationship,
  theory::{FanTheory, Vote},
  timeline::{Timeline, TimelineEvent},
};
use uuid::Uuid;

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Corrupt(format!("uuid {s:?}: {e}")))
}

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Corrupt(format!("timestamp {s:?}: {e}")))
}

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Corrupt(format!("unknown role: {s:?}")))
}

pub fn decode_approval(approved: bool) -> Approval {
  if approved { Approval::Approved } else { Approval::Pending }
}

// ─── JSON list columns ───────────────────────────────────────────────────────

pub fn encode_tags(tags: &[LoreTag]) -> Result<String> {
  serde_json::to_string(tags).map_err(Error::store)
}

pub fn decode_tags(s: &str) -> Result<Vec<LoreTag>> {
  serde_json::from_str(s).map_err(|e| Error::Corrupt(format!("tags {s:?}: {e}")))
}

pub fn encode_sources(sources: &[String]) -> Result<String> {
  serde_json::to_string(sources).map_err(Error::store)
}

pub fn decode_sources(s: &str) -> Result<Vec<String>> {
  serde_json::from_str(s)
    .map_err(|e| Error::Corrupt(format!("sources {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:    String,
  pub username:   String,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
  pub role:       String,
  pub created_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      avatar_url: self.avatar_url,
      bio:        self.bio,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `characters` row.
pub struct RawCharacter {
  pub id:               i64,
  pub name:             String,
  pub alias:            Option<String>,
  pub portrait_url:     Option<String>,
  pub sprite_url:       Option<String>,
  pub description:      Option<String>,
  pub first_appearance: Option<String>,
  pub series_id:        i64,
  pub is_robot_master:  bool,
  pub is_maverick:      bool,
  pub is_human:         bool,
  pub is_reploid:       bool,
  pub created_by:       Option<String>,
  pub created_at:       String,
}

impl RawCharacter {
  pub fn into_character(self) -> Result<Character> {
    Ok(Character {
      id:               self.id,
      name:             self.name,
      alias:            self.alias,
      portrait_url:     self.portrait_url,
      sprite_url:       self.sprite_url,
      description:      self.description,
      first_appearance: self.first_appearance,
      series_id:        self.series_id,
      flags:            ClassFlags {
        is_robot_master: self.is_robot_master,
        is_maverick:     self.is_maverick,
        is_human:        self.is_human,
        is_reploid:      self.is_reploid,
      },
      created_by:       decode_opt_uuid(self.created_by.as_deref())?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `relationships` row.
pub struct RawRelationship {
  pub id:                i64,
  pub source_id:         i64,
  pub target_id:         i64,
  pub relationship_type: String,
  pub description:       Option<String>,
  pub created_at:        String,
}

impl RawRelationship {
  pub fn into_relationship(self) -> Result<Relationship> {
    Ok(Relationship {
      id:                self.id,
      source_id:         self.source_id,
      target_id:         self.target_id,
      relationship_type: self.relationship_type,
      description:       self.description,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `lore_entries` row.
pub struct RawLoreEntry {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  pub series_id:   Option<i64>,
  pub tags:        String,
  pub sources:     String,
  pub creator_id:  Option<String>,
  pub is_approved: bool,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawLoreEntry {
  pub fn into_lore_entry(self) -> Result<LoreEntry> {
    Ok(LoreEntry {
      id:         self.id,
      title:      self.title,
      content:    self.content,
      series_id:  self.series_id,
      tags:       decode_tags(&self.tags)?,
      sources:    decode_sources(&self.sources)?,
      creator_id: decode_opt_uuid(self.creator_id.as_deref())?,
      approval:   decode_approval(self.is_approved),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `fan_theories` row.
pub struct RawTheory {
  pub id:                 i64,
  pub title:              String,
  pub description:        String,
  pub branching_point:    String,
  pub alternate_timeline: String,
  pub creator_id:         String,
  pub is_approved:        bool,
  pub upvotes:            i64,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawTheory {
  pub fn into_theory(self) -> Result<FanTheory> {
    Ok(FanTheory {
      id:                 self.id,
      title:              self.title,
      description:        self.description,
      branching_point:    self.branching_point,
      alternate_timeline: self.alternate_timeline,
      creator_id:         decode_uuid(&self.creator_id)?,
      approval:           decode_approval(self.is_approved),
      upvotes:            self.upvotes,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `votes` row.
pub struct RawVote {
  pub id:         i64,
  pub user_id:    String,
  pub theory_id:  i64,
  pub created_at: String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      id:         self.id,
      user_id:    decode_uuid(&self.user_id)?,
      theory_id:  self.theory_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub id:            i64,
  pub content:       String,
  pub user_id:       String,
  pub lore_entry_id: Option<i64>,
  pub fan_theory_id: Option<i64>,
  pub created_at:    String,
}

impl RawComment {
  pub fn into_comment(self) -> Result<Comment> {
    // The CHECK constraint guarantees exactly one parent id; a row that
    // violates it can only mean corruption.
    let parent = CommentParent::from_ids(self.lore_entry_id, self.fan_theory_id)
      .map_err(|_| {
        Error::Corrupt(format!("comment {} has no single parent", self.id))
      })?;

    Ok(Comment {
      id:         self.id,
      content:    self.content,
      user_id:    decode_uuid(&self.user_id)?,
      parent,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `timelines` row.
pub struct RawTimeline {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  pub is_official: bool,
  pub creator_id:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawTimeline {
  pub fn into_timeline(self) -> Result<Timeline> {
    Ok(Timeline {
      id:          self.id,
      title:       self.title,
      description: self.description,
      is_official: self.is_official,
      creator_id:  decode_opt_uuid(self.creator_id.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `timeline_events` row.
pub struct RawTimelineEvent {
  pub id:          i64,
  pub timeline_id: i64,
  pub title:       String,
  pub description: Option<String>,
  pub year:        String,
  pub series_id:   Option<i64>,
  pub importance:  i64,
  pub created_at:  String,
}

impl RawTimelineEvent {
  pub fn into_event(self) -> Result<TimelineEvent> {
    Ok(TimelineEvent {
      id:          self.id,
      timeline_id: self.timeline_id,
      title:       self.title,
      description: self.description,
      year:        self.year,
      series_id:   self.series_id,
      importance:  self.importance,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
