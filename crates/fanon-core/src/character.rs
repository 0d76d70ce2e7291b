//! Characters and their classification flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Independent classification flags. They are not mutually exclusive —
/// a character can be both a Maverick and a Reploid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(default)]
pub struct ClassFlags {
  pub is_robot_master: bool,
  pub is_maverick:     bool,
  pub is_human:        bool,
  pub is_reploid:      bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
  pub id:               i64,
  pub name:             String,
  pub alias:            Option<String>,
  pub portrait_url:     Option<String>,
  pub sprite_url:       Option<String>,
  pub description:      Option<String>,
  /// Game or issue of first appearance, free text.
  pub first_appearance: Option<String>,
  pub series_id:        i64,
  #[serde(flatten)]
  pub flags:            ClassFlags,
  pub created_by:       Option<Uuid>,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::add_character`].
/// `created_at` is always set by the store; it is not accepted from
/// callers.
#[derive(Debug, Clone)]
pub struct NewCharacter {
  pub name:             String,
  pub alias:            Option<String>,
  pub portrait_url:     Option<String>,
  pub sprite_url:       Option<String>,
  pub description:      Option<String>,
  pub first_appearance: Option<String>,
  pub series_id:        i64,
  pub flags:            ClassFlags,
  pub created_by:       Option<Uuid>,
}

impl NewCharacter {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>, series_id: i64) -> Self {
    Self {
      name: name.into(),
      alias: None,
      portrait_url: None,
      sprite_url: None,
      description: None,
      first_appearance: None,
      series_id,
      flags: ClassFlags::default(),
      created_by: None,
    }
  }
}
