//! Handlers for `/lore` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/lore` | Approved only; optional `series_id`, `tag` filters |
//! | `POST` | `/lore` | Authenticated; optional initial character links |
//! | `GET`  | `/lore/:id` | Creator sees own pending entries |
//! | `POST` | `/lore/:id/characters` | Link a character (idempotent) |
//! | `POST` | `/lore/:id/comments` | Authenticated |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fanon_core::{
  assoc::Association,
  catalog::LoreEntryDetail,
  comment::{Comment, CommentParent, NewComment},
  lore::{LoreEntry, LoreTag, NewLoreEntry},
  store::{ContentStore, LoreFilter, LoreListing},
};
use serde::Deserialize;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub series_id: Option<i64>,
  /// Tag label from the controlled vocabulary, e.g. `Game Only`.
  pub tag:       Option<String>,
}

/// `GET /lore[?series_id=<id>][&tag=<label>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<LoreListing>>, ApiError>
where
  S: ContentStore + Clone,
{
  let tag = params.tag.as_deref().map(LoreTag::parse).transpose()?;
  let filter = LoreFilter { series_id: params.series_id, tag };
  Ok(Json(state.catalog.lore_entries(filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:         String,
  pub content:       String,
  pub series_id:     Option<i64>,
  #[serde(default)]
  pub tags:          Vec<String>,
  #[serde(default)]
  pub sources:       Vec<String>,
  /// Characters to link immediately on creation.
  #[serde(default)]
  pub character_ids: Vec<i64>,
}

/// `POST /lore` — authenticated; returns 201 + the stored (pending)
/// entry. Tag labels outside the controlled vocabulary are a 400.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let tags = body
    .tags
    .iter()
    .map(|label| LoreTag::parse(label))
    .collect::<Result<Vec<_>, _>>()?;

  let entry: LoreEntry = state
    .store
    .add_lore_entry(NewLoreEntry {
      title:      body.title,
      content:    body.content,
      series_id:  body.series_id,
      tags,
      sources:    body.sources,
      creator_id: Some(user_id),
    })
    .await?;

  for character_id in body.character_ids {
    state.assoc.associate(character_id, entry.id).await?;
  }

  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /lore/:id` — 404 unless approved or the caller created it.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
) -> Result<Json<LoreEntryDetail>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.lore_entry_detail(id, caller.0).await?))
}

// ─── Link character ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub character_id: i64,
}

/// `POST /lore/:id/characters` — authenticated; idempotent, returns the
/// existing link when the pair is already associated.
pub async fn link_character<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
  Json(body): Json<LinkBody>,
) -> Result<Json<Association>, ApiError>
where
  S: ContentStore + Clone,
{
  caller.require()?;
  let association = state.assoc.associate(body.character_id, id).await?;
  Ok(Json(association))
}

// ─── Comment ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /lore/:id/comments` — authenticated; returns 201 + the comment.
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
  Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let comment: Comment = state
    .engage
    .add_comment(NewComment {
      content: body.content,
      user_id,
      parent: CommentParent::LoreEntry(id),
    })
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}
