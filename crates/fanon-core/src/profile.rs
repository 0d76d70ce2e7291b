//! Profiles and the public author reference embedded in read models.
//!
//! Authentication lives in an external identity service; a profile row is
//! keyed by the user id that service hands us and is trusted as given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Site-level privilege tier. Moderation actions themselves are out of
/// band; the role only travels with the profile for display.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Moderator,
  Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:    Uuid,
  pub username:   String,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::upsert_profile`]. The role is
/// never caller-supplied; new rows start as [`Role::User`].
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub user_id:    Uuid,
  pub username:   String,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
}

/// The public slice of a profile embedded in comments and creator fields.
///
/// Built from a [`Profile`] row in exactly one place; handlers never
/// assemble author shapes ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
  pub id:         Uuid,
  pub username:   String,
  pub avatar_url: Option<String>,
}

impl UserRef {
  pub fn from_profile(profile: &Profile) -> Self {
    Self {
      id:         profile.user_id,
      username:   profile.username.clone(),
      avatar_url: profile.avatar_url.clone(),
    }
  }
}
