//! Timelines — official chronology and fan-made alternates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::series::Series;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
  pub id:          i64,
  pub title:       String,
  pub description: Option<String>,
  pub is_official: bool,
  pub creator_id:  Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::add_timeline`]. Fan timelines
/// only; the official chronology is seeded out of band.
#[derive(Debug, Clone)]
pub struct NewTimeline {
  pub title:       String,
  pub description: Option<String>,
  pub creator_id:  Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
  pub id:          i64,
  pub timeline_id: i64,
  pub title:       String,
  pub description: Option<String>,
  /// Free text; the franchise's stylised years ("20XX") sort lexically.
  pub year:        String,
  pub series_id:   Option<i64>,
  /// Display weight, 1 is minor.
  pub importance:  i64,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTimelineEvent {
  pub timeline_id: i64,
  pub title:       String,
  pub description: Option<String>,
  pub year:        String,
  pub series_id:   Option<i64>,
  pub importance:  i64,
}

/// An event with its series resolved for display colouring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEventView {
  pub event:  TimelineEvent,
  pub series: Option<Series>,
}
