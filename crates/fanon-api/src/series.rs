//! Handlers for `/series` endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use fanon_core::{
  series::{NewSeries, Series},
  store::ContentStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CallerIdentity, error::ApiError};

/// `GET /series`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Series>>, ApiError>
where
  S: ContentStore + Clone,
{
  Ok(Json(state.catalog.series().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: Option<String>,
  pub start_year:  Option<String>,
  pub end_year:    Option<String>,
  pub color_code:  String,
}

/// `POST /series` — authenticated.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: CallerIdentity,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + Clone,
{
  caller.require()?;
  let series = state
    .store
    .add_series(NewSeries {
      name:        body.name,
      description: body.description,
      start_year:  body.start_year,
      end_year:    body.end_year,
      color_code:  body.color_code,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(series)))
}
