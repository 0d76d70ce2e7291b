//! Lore entries and their controlled tag vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Moderation visibility. New content starts [`Approval::Pending`] and
/// becomes publicly visible only once a moderator approves it. There is
/// no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approval {
  Pending,
  Approved,
}

impl Approval {
  pub fn is_approved(self) -> bool { matches!(self, Self::Approved) }
}

/// The closed tag vocabulary for lore entries. Anything outside this set
/// is rejected on write.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum LoreTag {
  Canon,
  Disputed,
  Theory,
  #[serde(rename = "Game Only")]
  #[strum(serialize = "Game Only")]
  GameOnly,
  #[serde(rename = "Manga Only")]
  #[strum(serialize = "Manga Only")]
  MangaOnly,
}

impl LoreTag {
  /// Parse a caller-supplied label, mapping failures into the domain
  /// error so transports surface them as validation failures.
  pub fn parse(label: &str) -> Result<Self> {
    label
      .parse()
      .map_err(|_| Error::UnknownTag(label.to_owned()))
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
  pub id:         i64,
  pub title:      String,
  pub content:    String,
  pub series_id:  Option<i64>,
  pub tags:       Vec<LoreTag>,
  /// Ordered citations, free text.
  pub sources:    Vec<String>,
  pub creator_id: Option<Uuid>,
  pub approval:   Approval,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::add_lore_entry`]. Entries are
/// always created Pending; timestamps are set by the store.
#[derive(Debug, Clone)]
pub struct NewLoreEntry {
  pub title:      String,
  pub content:    String,
  pub series_id:  Option<i64>,
  pub tags:       Vec<LoreTag>,
  pub sources:    Vec<String>,
  pub creator_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_labels_round_trip() {
    for (tag, label) in [
      (LoreTag::Canon, "Canon"),
      (LoreTag::Disputed, "Disputed"),
      (LoreTag::Theory, "Theory"),
      (LoreTag::GameOnly, "Game Only"),
      (LoreTag::MangaOnly, "Manga Only"),
    ] {
      assert_eq!(tag.to_string(), label);
      assert_eq!(LoreTag::parse(label).unwrap(), tag);
    }
  }

  #[test]
  fn unknown_tag_is_rejected() {
    let err = LoreTag::parse("Fanon").unwrap_err();
    assert!(matches!(err, Error::UnknownTag(ref label) if label == "Fanon"));
    assert_eq!(err.kind(), crate::ErrorKind::Validation);
  }
}
