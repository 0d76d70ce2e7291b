//! The relationship graph — validated edge writes and the symmetric,
//! direction-normalized per-character view.

use crate::{
  Error, Result,
  relationship::{NewRelationship, Relationship, RelationshipView},
  store::ContentStore,
};

/// Service component for typed edges between characters.
///
/// Cloning is cheap when the underlying store clone is cheap.
#[derive(Debug, Clone)]
pub struct RelationshipGraph<S> {
  store: S,
}

impl<S: ContentStore> RelationshipGraph<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Insert a new directed edge.
  ///
  /// Self-relationships are invalid and both endpoints must resolve. A
  /// second edge with the same unordered pair and the same type is a
  /// conflict regardless of stored direction; the inverse direction with
  /// a *different* type stays legal (asymmetric phrasing).
  pub async fn add_edge(&self, input: NewRelationship) -> Result<Relationship> {
    if input.source_id == input.target_id {
      return Err(Error::SelfRelationship);
    }

    for id in [input.source_id, input.target_id] {
      if self.store.get_character(id).await?.is_none() {
        return Err(Error::CharacterNotFound(id));
      }
    }

    if self
      .store
      .find_relationship(
        input.source_id,
        input.target_id,
        input.relationship_type.clone(),
      )
      .await?
      .is_some()
    {
      return Err(Error::DuplicateRelationship(
        input.source_id,
        input.target_id,
        input.relationship_type,
      ));
    }

    self.store.insert_relationship(input).await
  }

  /// Every edge touching the character, re-oriented from its
  /// perspective. Each edge appears exactly once; ordering is stable for
  /// a given snapshot (edge id). Callers group by type for display.
  pub async fn edges_for_character(
    &self,
    character_id: i64,
  ) -> Result<Vec<RelationshipView>> {
    let edges = self.store.relationships_touching(character_id).await?;
    Ok(
      edges
        .iter()
        .filter_map(|edge| edge.viewed_from(character_id))
        .collect(),
    )
  }

  /// Delete an edge. Deletion is not idempotent: once the edge is gone,
  /// further calls fail.
  pub async fn remove_edge(&self, edge_id: i64) -> Result<()> {
    if !self.store.delete_relationship(edge_id).await? {
      return Err(Error::RelationshipNotFound(edge_id));
    }
    Ok(())
  }
}
