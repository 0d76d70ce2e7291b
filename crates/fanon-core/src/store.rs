//! The `ContentStore` trait and supporting query types.
//!
//! The trait is the repository: the only contract that issues storage
//! queries. It is implemented by storage backends (e.g.
//! `fanon-store-sqlite`); the service components in this crate and the
//! HTTP layer depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  assoc::Association,
  character::{Character, NewCharacter},
  comment::{Comment, CommentParent, CommentView, NewComment},
  lore::{LoreEntry, LoreTag, NewLoreEntry},
  profile::{NewProfile, Profile, UserRef},
  relationship::{NewRelationship, Relationship},
  series::{NewSeries, Series},
  theory::{FanTheory, NewFanTheory, Vote, VoteReceipt},
  timeline::{NewTimeline, NewTimelineEvent, Timeline, TimelineEvent, TimelineEventView},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`ContentStore::list_lore_entries`]. Listings only ever
/// return approved entries; the filters narrow within that.
#[derive(Debug, Clone, Default)]
pub struct LoreFilter {
  pub series_id: Option<i64>,
  /// Entries must carry this tag.
  pub tag:       Option<LoreTag>,
}

// ─── Listing composites ──────────────────────────────────────────────────────

/// A character with its series resolved for display colouring.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CharacterListing {
  pub character: Character,
  pub series:    Option<Series>,
}

/// A lore entry with its series and creator resolved.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoreListing {
  pub entry:   LoreEntry,
  pub series:  Option<Series>,
  pub creator: Option<UserRef>,
}

/// A theory with its creator resolved.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TheoryListing {
  pub theory:  FanTheory,
  pub creator: Option<UserRef>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Fanon storage backend.
///
/// Reads that embed other entities (series, creators) perform the joins
/// backend-side; visibility rules (approval gating) and graph semantics
/// live in the service components, not here. The one exception is
/// [`ContentStore::toggle_vote`], which must be a single transactional
/// unit of work so the denormalized counter can never drift from the
/// vote rows.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContentStore: Send + Sync {
  // ── Profiles ──────────────────────────────────────────────────────────

  /// Insert or update the profile row for an externally-authenticated
  /// user id. The role of an existing row is preserved.
  fn upsert_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile>> + Send + '_;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>>> + Send + '_;

  // ── Series ────────────────────────────────────────────────────────────

  fn add_series(
    &self,
    input: NewSeries,
  ) -> impl Future<Output = Result<Series>> + Send + '_;

  fn get_series(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Series>>> + Send + '_;

  fn list_series(&self)
  -> impl Future<Output = Result<Vec<Series>>> + Send + '_;

  // ── Characters ────────────────────────────────────────────────────────

  fn add_character(
    &self,
    input: NewCharacter,
  ) -> impl Future<Output = Result<Character>> + Send + '_;

  fn get_character(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Character>>> + Send + '_;

  /// Bulk fetch; missing ids are silently absent from the result.
  fn get_characters(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<Vec<Character>>> + Send + '_;

  /// All characters ordered by name, optionally narrowed to a series.
  fn list_characters(
    &self,
    series_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<CharacterListing>>> + Send + '_;

  // ── Relationship edges ────────────────────────────────────────────────

  fn insert_relationship(
    &self,
    input: NewRelationship,
  ) -> impl Future<Output = Result<Relationship>> + Send + '_;

  /// Any edge linking the unordered pair with this type, regardless of
  /// stored direction.
  fn find_relationship(
    &self,
    a: i64,
    b: i64,
    relationship_type: String,
  ) -> impl Future<Output = Result<Option<Relationship>>> + Send + '_;

  /// Returns `true` if a row was deleted.
  fn delete_relationship(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Every edge with the character as either endpoint, ordered by id.
  fn relationships_touching(
    &self,
    character_id: i64,
  ) -> impl Future<Output = Result<Vec<Relationship>>> + Send + '_;

  // ── Character ↔ lore associations ─────────────────────────────────────

  fn find_association(
    &self,
    character_id: i64,
    lore_entry_id: i64,
  ) -> impl Future<Output = Result<Option<Association>>> + Send + '_;

  fn insert_association(
    &self,
    character_id: i64,
    lore_entry_id: i64,
  ) -> impl Future<Output = Result<Association>> + Send + '_;

  fn characters_for_lore_entry(
    &self,
    lore_entry_id: i64,
  ) -> impl Future<Output = Result<Vec<CharacterListing>>> + Send + '_;

  fn lore_entries_for_character(
    &self,
    character_id: i64,
  ) -> impl Future<Output = Result<Vec<LoreListing>>> + Send + '_;

  // ── Lore entries ──────────────────────────────────────────────────────

  fn add_lore_entry(
    &self,
    input: NewLoreEntry,
  ) -> impl Future<Output = Result<LoreEntry>> + Send + '_;

  fn get_lore_entry(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<LoreEntry>>> + Send + '_;

  /// Approved entries only, newest first.
  fn list_lore_entries(
    &self,
    filter: LoreFilter,
  ) -> impl Future<Output = Result<Vec<LoreListing>>> + Send + '_;

  /// Moderation hook; fails with `LoreEntryNotFound` if the id does not
  /// resolve. Approval is terminal.
  fn approve_lore_entry(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Fan theories ──────────────────────────────────────────────────────

  fn add_theory(
    &self,
    input: NewFanTheory,
  ) -> impl Future<Output = Result<FanTheory>> + Send + '_;

  fn get_theory(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FanTheory>>> + Send + '_;

  /// Approved theories only, most upvoted first.
  fn list_theories(
    &self,
  ) -> impl Future<Output = Result<Vec<TheoryListing>>> + Send + '_;

  /// Moderation hook; see [`ContentStore::approve_lore_entry`].
  fn approve_theory(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Atomically create or remove the (user, theory) vote row and adjust
  /// the theory's upvote counter in the same unit of work. Both mutations
  /// commit or neither does.
  fn toggle_vote(
    &self,
    user_id: Uuid,
    theory_id: i64,
  ) -> impl Future<Output = Result<VoteReceipt>> + Send + '_;

  fn find_vote(
    &self,
    user_id: Uuid,
    theory_id: i64,
  ) -> impl Future<Output = Result<Option<Vote>>> + Send + '_;

  fn count_votes(
    &self,
    theory_id: i64,
  ) -> impl Future<Output = Result<i64>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn insert_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment>> + Send + '_;

  /// Comments on a parent, oldest first, authors resolved.
  fn comments_for(
    &self,
    parent: CommentParent,
  ) -> impl Future<Output = Result<Vec<CommentView>>> + Send + '_;

  // ── Timelines ─────────────────────────────────────────────────────────

  fn add_timeline(
    &self,
    input: NewTimeline,
  ) -> impl Future<Output = Result<Timeline>> + Send + '_;

  fn get_timeline(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Timeline>>> + Send + '_;

  fn list_timelines(
    &self,
    is_official: Option<bool>,
  ) -> impl Future<Output = Result<Vec<Timeline>>> + Send + '_;

  fn add_timeline_event(
    &self,
    input: NewTimelineEvent,
  ) -> impl Future<Output = Result<TimelineEvent>> + Send + '_;

  /// Events for a timeline ordered by year, optionally narrowed to a
  /// series.
  fn events_for_timeline(
    &self,
    timeline_id: i64,
    series_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<TimelineEventView>>> + Send + '_;
}
