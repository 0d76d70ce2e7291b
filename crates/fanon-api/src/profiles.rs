//! Handlers for profile endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/profile` | Upsert the caller's own profile |
//! | `GET`  | `/profiles/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
};
use fanon_core::{
  profile::{NewProfile, Profile},
  store::ContentStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UpsertBody {
  pub username:   String,
  pub avatar_url: Option<String>,
  pub bio:        Option<String>,
}

/// `PUT /profile` — body: [`UpsertBody`]. The profile written is always
/// the caller's own; the role of an existing profile is untouched.
pub async fn upsert_self<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<UpsertBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let profile = state
    .store
    .upsert_profile(NewProfile {
      user_id,
      username: body.username,
      avatar_url: body.avatar_url,
      bio: body.bio,
    })
    .await?;
  Ok(Json(profile))
}

/// `GET /profiles/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.profile(id).await?))
}
