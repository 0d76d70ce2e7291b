//! Handlers for `/timelines` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fanon_core::{
  store::ContentStore,
  timeline::{NewTimeline, NewTimelineEvent, Timeline, TimelineEvent, TimelineEventView},
};
use serde::Deserialize;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub is_official: Option<bool>,
}

/// `GET /timelines[?is_official=true|false]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Timeline>>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.timelines(params.is_official).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  pub description: Option<String>,
}

/// `POST /timelines` — authenticated; fan timelines only.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  let user_id = caller.require()?;
  let timeline = state
    .store
    .add_timeline(NewTimeline {
      title:       body.title,
      description: body.description,
      creator_id:  Some(user_id),
    })
    .await?;
  Ok((StatusCode::CREATED, Json(timeline)))
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EventParams {
  pub series_id: Option<i64>,
}

/// `GET /timelines/:id/events[?series_id=<id>]` — ordered by year.
pub async fn events<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<EventParams>,
) -> Result<Json<Vec<TimelineEventView>>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.timeline_events(id, params.series_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddEventBody {
  pub title:       String,
  pub description: Option<String>,
  pub year:        String,
  pub series_id:   Option<i64>,
  #[serde(default = "default_importance")]
  pub importance:  i64,
}

fn default_importance() -> i64 { 1 }

/// `POST /timelines/:id/events` — authenticated; returns 201 + the
/// stored event.
pub async fn add_event<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Path(id): Path<i64>,
  Json(body): Json<AddEventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  caller.require()?;
  let event: TimelineEvent = state
    .store
    .add_timeline_event(NewTimelineEvent {
      timeline_id: id,
      title:       body.title,
      description: body.description,
      year:        body.year,
      series_id:   body.series_id,
      importance:  body.importance,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(event)))
}
