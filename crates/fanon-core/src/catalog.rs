//! The query façade — read models assembled for the presentation layer.
//!
//! This is the only place the graph, the association index, and the
//! engagement aggregator are composed, and the only place approval
//! gating is applied. Read models are computed, never stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  assoc::AssociationIndex,
  character::Character,
  comment::{CommentParent, CommentView},
  engage::EngagementAggregator,
  graph::RelationshipGraph,
  lore::LoreEntry,
  profile::{Profile, UserRef},
  relationship::Direction,
  series::Series,
  store::{CharacterListing, ContentStore, LoreFilter, LoreListing, TheoryListing},
  theory::FanTheory,
  timeline::{Timeline, TimelineEventView},
};

// ─── Read models ─────────────────────────────────────────────────────────────

/// A relationship as displayed on a character page: the edge re-oriented
/// from the page character's perspective, with the other endpoint
/// resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedCharacter {
  pub edge_id:           i64,
  pub relationship_type: String,
  pub description:       Option<String>,
  pub direction:         Direction,
  pub character:         Character,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDetail {
  pub character:     Character,
  pub series:        Option<Series>,
  pub relationships: Vec<RelatedCharacter>,
  /// Approved entries only, whoever asks.
  pub lore_entries:  Vec<LoreListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntryDetail {
  pub entry:              LoreEntry,
  pub series:             Option<Series>,
  pub creator:            Option<UserRef>,
  /// Each with its own series for display colouring.
  pub related_characters: Vec<CharacterListing>,
  /// Oldest first.
  pub comments:           Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheoryDetail {
  pub theory:      FanTheory,
  pub creator:     Option<UserRef>,
  pub comments:    Vec<CommentView>,
  /// Whether the requesting user has upvoted; `false` for anonymous
  /// callers.
  pub has_upvoted: bool,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The read surface the presentation layer consumes.
#[derive(Debug, Clone)]
pub struct Catalog<S> {
  store:  S,
  graph:  RelationshipGraph<S>,
  assoc:  AssociationIndex<S>,
  engage: EngagementAggregator<S>,
}

impl<S: ContentStore + Clone> Catalog<S> {
  pub fn new(store: S) -> Self {
    Self {
      graph:  RelationshipGraph::new(store.clone()),
      assoc:  AssociationIndex::new(store.clone()),
      engage: EngagementAggregator::new(store.clone()),
      store,
    }
  }

  // ── Details ───────────────────────────────────────────────────────────

  pub async fn character_detail(
    &self,
    character_id: i64,
  ) -> Result<CharacterDetail> {
    let character = self
      .store
      .get_character(character_id)
      .await?
      .ok_or(Error::CharacterNotFound(character_id))?;
    let series = self.store.get_series(character.series_id).await?;

    let views = self.graph.edges_for_character(character_id).await?;
    let others: HashMap<i64, Character> = self
      .store
      .get_characters(views.iter().map(|v| v.other_id).collect())
      .await?
      .into_iter()
      .map(|c| (c.id, c))
      .collect();

    let relationships = views
      .into_iter()
      .filter_map(|view| {
        let character = others.get(&view.other_id)?.clone();
        Some(RelatedCharacter {
          edge_id: view.id,
          relationship_type: view.relationship_type,
          description: view.description,
          direction: view.direction,
          character,
        })
      })
      .collect();

    let lore_entries = self
      .assoc
      .lore_entries_for_character(character_id)
      .await?
      .into_iter()
      .filter(|listing| listing.entry.approval.is_approved())
      .collect();

    Ok(CharacterDetail { character, series, relationships, lore_entries })
  }

  pub async fn lore_entry_detail(
    &self,
    lore_entry_id: i64,
    caller: Option<Uuid>,
  ) -> Result<LoreEntryDetail> {
    let entry = self
      .store
      .get_lore_entry(lore_entry_id)
      .await?
      .filter(|entry| visible_to(entry.approval.is_approved(), entry.creator_id, caller))
      .ok_or(Error::LoreEntryNotFound(lore_entry_id))?;

    let series = match entry.series_id {
      Some(id) => self.store.get_series(id).await?,
      None => None,
    };
    let creator = self.resolve_user(entry.creator_id).await?;
    let related_characters =
      self.assoc.characters_for_lore_entry(lore_entry_id).await?;
    let comments = self
      .engage
      .comments_for(CommentParent::LoreEntry(lore_entry_id))
      .await?;

    Ok(LoreEntryDetail { entry, series, creator, related_characters, comments })
  }

  pub async fn theory_detail(
    &self,
    theory_id: i64,
    caller: Option<Uuid>,
  ) -> Result<TheoryDetail> {
    let theory = self
      .store
      .get_theory(theory_id)
      .await?
      .filter(|theory| {
        visible_to(theory.approval.is_approved(), Some(theory.creator_id), caller)
      })
      .ok_or(Error::TheoryNotFound(theory_id))?;

    let creator = self.resolve_user(Some(theory.creator_id)).await?;
    let comments = self
      .engage
      .comments_for(CommentParent::FanTheory(theory_id))
      .await?;
    let has_upvoted = match caller {
      Some(user_id) => self.engage.has_voted(user_id, theory_id).await?,
      None => false,
    };

    Ok(TheoryDetail { theory, creator, comments, has_upvoted })
  }

  // ── Listings ──────────────────────────────────────────────────────────

  pub async fn characters(
    &self,
    series_id: Option<i64>,
  ) -> Result<Vec<CharacterListing>> {
    self.store.list_characters(series_id).await
  }

  pub async fn lore_entries(
    &self,
    filter: LoreFilter,
  ) -> Result<Vec<LoreListing>> {
    self.store.list_lore_entries(filter).await
  }

  pub async fn theories(&self) -> Result<Vec<TheoryListing>> {
    self.store.list_theories().await
  }

  pub async fn series(&self) -> Result<Vec<Series>> {
    self.store.list_series().await
  }

  pub async fn timelines(
    &self,
    is_official: Option<bool>,
  ) -> Result<Vec<Timeline>> {
    self.store.list_timelines(is_official).await
  }

  pub async fn timeline_events(
    &self,
    timeline_id: i64,
    series_id: Option<i64>,
  ) -> Result<Vec<TimelineEventView>> {
    if self.store.get_timeline(timeline_id).await?.is_none() {
      return Err(Error::TimelineNotFound(timeline_id));
    }
    self.store.events_for_timeline(timeline_id, series_id).await
  }

  pub async fn profile(&self, user_id: Uuid) -> Result<Profile> {
    self
      .store
      .get_profile(user_id)
      .await?
      .ok_or(Error::ProfileNotFound(user_id))
  }

  async fn resolve_user(&self, id: Option<Uuid>) -> Result<Option<UserRef>> {
    let Some(id) = id else { return Ok(None) };
    Ok(
      self
        .store
        .get_profile(id)
        .await?
        .map(|profile| UserRef::from_profile(&profile)),
    )
  }
}

/// The approval gate: approved content is public, pending content is
/// visible only to its creator (preview-before-approval).
fn visible_to(
  approved: bool,
  creator_id: Option<Uuid>,
  caller: Option<Uuid>,
) -> bool {
  approved || (caller.is_some() && creator_id == caller)
}

#[cfg(test)]
mod tests {
  use super::visible_to;
  use uuid::Uuid;

  #[test]
  fn approval_gate() {
    let creator = Uuid::new_v4();
    let other = Uuid::new_v4();

    assert!(visible_to(true, Some(creator), None));
    assert!(visible_to(true, Some(creator), Some(other)));
    assert!(visible_to(false, Some(creator), Some(creator)));
    assert!(!visible_to(false, Some(creator), Some(other)));
    assert!(!visible_to(false, Some(creator), None));
    // Ownerless pending content is visible to no one.
    assert!(!visible_to(false, None, None));
  }
}
