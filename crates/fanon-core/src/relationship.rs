//! Relationship edges between two characters.
//!
//! Edges are stored strictly directionally. Presentation is symmetric:
//! a per-character view reports every edge touching the character, with a
//! direction marker so the UI can phrase it ("has ally" vs "is ally of").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which role the viewing character plays in an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  /// The viewing character is the source of the edge.
  Outgoing,
  /// The viewing character is the target of the edge.
  Incoming,
}

/// A directed, typed edge between two characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
  pub id:                i64,
  pub source_id:         i64,
  pub target_id:         i64,
  /// Free-text label, e.g. "ally", "enemy", "creator".
  pub relationship_type: String,
  pub description:       Option<String>,
  pub created_at:        DateTime<Utc>,
}

impl Relationship {
  /// True if this edge links the same unordered pair as `(a, b)`.
  pub fn links_pair(&self, a: i64, b: i64) -> bool {
    (self.source_id == a && self.target_id == b)
      || (self.source_id == b && self.target_id == a)
  }

  /// Re-orient the edge from one character's perspective, or `None` if
  /// the character is not an endpoint. A self-edge can never exist, so
  /// every touching edge lands in exactly one direction.
  pub fn viewed_from(&self, character_id: i64) -> Option<RelationshipView> {
    let (other_id, direction) = if self.source_id == character_id {
      (self.target_id, Direction::Outgoing)
    } else if self.target_id == character_id {
      (self.source_id, Direction::Incoming)
    } else {
      return None;
    };

    Some(RelationshipView {
      id: self.id,
      other_id,
      relationship_type: self.relationship_type.clone(),
      description: self.description.clone(),
      direction,
    })
  }
}

/// An edge as seen from one character's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipView {
  pub id:                i64,
  pub other_id:          i64,
  pub relationship_type: String,
  pub description:       Option<String>,
  pub direction:         Direction,
}

/// Input to [`crate::graph::RelationshipGraph::add_edge`].
#[derive(Debug, Clone)]
pub struct NewRelationship {
  pub source_id:         i64,
  pub target_id:         i64,
  pub relationship_type: String,
  pub description:       Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn edge(source: i64, target: i64) -> Relationship {
    Relationship {
      id: 7,
      source_id: source,
      target_id: target,
      relationship_type: "ally".into(),
      description: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn viewed_from_source_is_outgoing() {
    let view = edge(1, 2).viewed_from(1).unwrap();
    assert_eq!(view.other_id, 2);
    assert_eq!(view.direction, Direction::Outgoing);
  }

  #[test]
  fn viewed_from_target_is_incoming() {
    let view = edge(1, 2).viewed_from(2).unwrap();
    assert_eq!(view.other_id, 1);
    assert_eq!(view.direction, Direction::Incoming);
  }

  #[test]
  fn viewed_from_bystander_is_none() {
    assert!(edge(1, 2).viewed_from(3).is_none());
  }

  #[test]
  fn links_pair_ignores_order() {
    let e = edge(1, 2);
    assert!(e.links_pair(1, 2));
    assert!(e.links_pair(2, 1));
    assert!(!e.links_pair(1, 3));
  }
}
