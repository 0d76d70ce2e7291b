//! Handlers for `/relationships` endpoints.
//!
//! Edges are created strictly directionally. A caller who wants the
//! inverse phrasing stored as well posts it separately with its own
//! type and description.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use fanon_core::{
  relationship::{NewRelationship, Relationship},
  store::ContentStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub source_id:         i64,
  pub target_id:         i64,
  pub relationship_type: String,
  pub description:       Option<String>,
}

/// `POST /relationships` — authenticated; returns 201 + the stored edge.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  caller.require()?;
  let edge: Relationship = state
    .graph
    .add_edge(NewRelationship {
      source_id:         body.source_id,
      target_id:         body.target_id,
      relationship_type: body.relationship_type,
      description:       body.description,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /relationships/:id` — authenticated. Not idempotent: a second
/// delete of the same edge is a 404.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + Clone,
{
  caller.require()?;
  state.graph.remove_edge(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
