//! The association index — many-to-many links between characters and
//! lore entries, resolved into entity lists on read.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  store::{CharacterListing, ContentStore, LoreListing},
};

/// A bare join row. Carries nothing beyond the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
  pub id:            i64,
  pub character_id:  i64,
  pub lore_entry_id: i64,
}

#[derive(Debug, Clone)]
pub struct AssociationIndex<S> {
  store: S,
}

impl<S: ContentStore> AssociationIndex<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Link a character to a lore entry. Idempotent from the caller's
  /// view: if the pair is already linked the existing row is returned.
  /// The check-then-insert tolerates a raced duplicate join row; the
  /// resolution reads de-duplicate.
  pub async fn associate(
    &self,
    character_id: i64,
    lore_entry_id: i64,
  ) -> Result<Association> {
    if self.store.get_character(character_id).await?.is_none() {
      return Err(Error::CharacterNotFound(character_id));
    }
    if self.store.get_lore_entry(lore_entry_id).await?.is_none() {
      return Err(Error::LoreEntryNotFound(lore_entry_id));
    }

    if let Some(existing) = self
      .store
      .find_association(character_id, lore_entry_id)
      .await?
    {
      return Ok(existing);
    }

    self
      .store
      .insert_association(character_id, lore_entry_id)
      .await
  }

  pub async fn characters_for_lore_entry(
    &self,
    lore_entry_id: i64,
  ) -> Result<Vec<CharacterListing>> {
    let characters = self.store.characters_for_lore_entry(lore_entry_id).await?;
    Ok(dedup_by_id(characters, |c| c.character.id))
  }

  pub async fn lore_entries_for_character(
    &self,
    character_id: i64,
  ) -> Result<Vec<LoreListing>> {
    let entries = self.store.lore_entries_for_character(character_id).await?;
    Ok(dedup_by_id(entries, |l| l.entry.id))
  }
}

/// Drop later occurrences of an id, preserving first-seen order.
fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> i64) -> Vec<T> {
  let mut seen = std::collections::HashSet::new();
  items.into_iter().filter(|item| seen.insert(id(item))).collect()
}
