//! Comments — append-only, attached to exactly one parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, profile::UserRef};

/// The single parent a comment attaches to. Constructing one from the
/// raw optional-id pair is the only validation point; past it, "both" or
/// "neither" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentParent {
  LoreEntry(i64),
  FanTheory(i64),
}

impl CommentParent {
  /// Build from the nullable column pair. Exactly one id must be set.
  pub fn from_ids(
    lore_entry_id: Option<i64>,
    fan_theory_id: Option<i64>,
  ) -> Result<Self> {
    match (lore_entry_id, fan_theory_id) {
      (Some(id), None) => Ok(Self::LoreEntry(id)),
      (None, Some(id)) => Ok(Self::FanTheory(id)),
      _ => Err(Error::AmbiguousCommentParent),
    }
  }

  pub fn lore_entry_id(self) -> Option<i64> {
    match self {
      Self::LoreEntry(id) => Some(id),
      Self::FanTheory(_) => None,
    }
  }

  pub fn fan_theory_id(self) -> Option<i64> {
    match self {
      Self::LoreEntry(_) => None,
      Self::FanTheory(id) => Some(id),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id:         i64,
  pub content:    String,
  pub user_id:    Uuid,
  pub parent:     CommentParent,
  pub created_at: DateTime<Utc>,
}

/// A comment with its author resolved for display. The author is `None`
/// when the profile row has since disappeared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  pub comment: Comment,
  pub user:    Option<UserRef>,
}

/// Input to [`crate::engage::EngagementAggregator::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub content: String,
  pub user_id: Uuid,
  pub parent:  CommentParent,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exactly_one_parent_id() {
    assert_eq!(
      CommentParent::from_ids(Some(3), None).unwrap(),
      CommentParent::LoreEntry(3)
    );
    assert_eq!(
      CommentParent::from_ids(None, Some(9)).unwrap(),
      CommentParent::FanTheory(9)
    );
  }

  #[test]
  fn both_or_neither_rejected() {
    for (lore, theory) in [(None, None), (Some(3), Some(9))] {
      let err = CommentParent::from_ids(lore, theory).unwrap_err();
      assert!(matches!(err, Error::AmbiguousCommentParent));
      assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
  }
}
