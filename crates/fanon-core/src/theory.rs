//! Fan theories — "what if" scenarios — and their votes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lore::Approval;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanTheory {
  pub id:                 i64,
  pub title:              String,
  pub description:        String,
  /// Where the theory diverges from canon, free text.
  pub branching_point:    String,
  pub alternate_timeline: String,
  pub creator_id:         Uuid,
  pub approval:           Approval,
  /// Denormalized; equals the number of vote rows for this theory after
  /// every completed mutation.
  pub upvotes:            i64,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFanTheory {
  pub title:              String,
  pub description:        String,
  pub branching_point:    String,
  pub alternate_timeline: String,
  pub creator_id:         Uuid,
}

/// One user's upvote on one theory. Voting is a toggle, so at most one
/// row exists per (user, theory) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
  pub id:         i64,
  pub user_id:    Uuid,
  pub theory_id:  i64,
  pub created_at: DateTime<Utc>,
}

/// Post-toggle state returned by
/// [`crate::engage::EngagementAggregator::toggle_vote`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoteReceipt {
  pub upvoted: bool,
  pub upvotes: i64,
}
