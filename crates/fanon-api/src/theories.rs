//! Handlers for `/theories` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/theories` | Approved only, most upvoted first |
//! | `POST` | `/theories` | Authenticated |
//! | `GET`  | `/theories/:id` | Creator sees own pending theories |
//! | `POST` | `/theories/:id/vote` | Toggle; returns post-toggle state |
//! | `GET`  | `/theories/:id/vote` | The caller's current vote state |
//! | `POST` | `/theories/:id/comments` | Authenticated |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use fanon_core::{
  catalog::TheoryDetail,
  comment::{Comment, CommentParent, NewComment},
  store::{ContentStore, TheoryListing},
  theory::{FanTheory, NewFanTheory, VoteReceipt},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::CallerIdentity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /theories`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<TheoryListing>>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.theories().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:              String,
  pub description:        String,
  pub branching_point:    String,
  pub alternate_timeline: String,
}

/// `POST /theories` — authenticated; returns 201 + the stored (pending)
/// theory.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let theory: FanTheory = state
    .store
    .add_theory(NewFanTheory {
      title:              body.title,
      description:        body.description,
      branching_point:    body.branching_point,
      alternate_timeline: body.alternate_timeline,
      creator_id:         user_id,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(theory)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /theories/:id` — 404 unless approved or the caller created it.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
) -> Result<Json<TheoryDetail>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.theory_detail(id, caller.0).await?))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

/// `POST /theories/:id/vote` — authenticated toggle. The vote row and
/// the counter move together or not at all.
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
) -> Result<Json<VoteReceipt>, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  Ok(Json(state.engage.toggle_vote(user_id, id).await?))
}

#[derive(Debug, Serialize)]
pub struct VoteState {
  pub has_voted: bool,
}

/// `GET /theories/:id/vote` — authenticated; pure query.
pub async fn vote_state<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
) -> Result<Json<VoteState>, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let has_voted = state.engage.has_voted(user_id, id).await?;
  Ok(Json(VoteState { has_voted }))
}

// ─── Comment ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub content: String,
}

/// `POST /theories/:id/comments` — authenticated; returns 201 + the
/// comment.
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
      parent: CommentParent::FanTheory(id),
    })
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}
