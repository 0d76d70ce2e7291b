//! Handlers for `/characters` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/characters` | Optional `?series_id=` filter, ordered by name |
//! | `POST` | `/characters` | Authenticated; body: [`CreateBody`] |
//! | `GET`  | `/characters/:id` | Full detail: relationships + approved lore |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fanon_core::{
  catalog::CharacterDetail,
  character::{Character, ClassFlags, NewCharacter},
  store::{CharacterListing, ContentStore},
};
use serde::Deserialize;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub series_id: Option<i64>,
}

/// `GET /characters[?series_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CharacterListing>>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.characters(params.series_id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:             String,
  pub alias:            Option<String>,
  pub portrait_url:     Option<String>,
  pub sprite_url:       Option<String>,
  pub description:      Option<String>,
  pub first_appearance: Option<String>,
  pub series_id:        i64,
  #[serde(flatten)]
  pub flags:            ClassFlags,
}

/// `POST /characters` — authenticated; returns 201 + the stored row.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let character: Character = state
    .store
    .add_character(NewCharacter {
      name:             body.name,
      alias:            body.alias,
      portrait_url:     body.portrait_url,
      sprite_url:       body.sprite_url,
      description:      body.description,
      first_appearance: body.first_appearance,
      series_id:        body.series_id,
      flags:            body.flags,
      created_by:       Some(user_id),
    })
    .await?;
  Ok((StatusCode::CREATED, Json(character)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /characters/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<CharacterDetail>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.character_detail(id).await?))
}
