//! The engagement aggregator — comments and votes, with the denormalized
//! upvote counter kept consistent with the vote rows.

use uuid::Uuid;

use crate::{
  Error, Result,
  comment::{Comment, CommentParent, CommentView, NewComment},
  store::ContentStore,
  theory::VoteReceipt,
};

#[derive(Debug, Clone)]
pub struct EngagementAggregator<S> {
  store: S,
}

impl<S: ContentStore> EngagementAggregator<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Append a comment. Content must be non-blank and the parent row must
  /// exist; comments are never edited afterwards.
  pub async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    if input.content.trim().is_empty() {
      return Err(Error::EmptyComment);
    }

    match input.parent {
      CommentParent::LoreEntry(id) => {
        if self.store.get_lore_entry(id).await?.is_none() {
          return Err(Error::LoreEntryNotFound(id));
        }
      }
      CommentParent::FanTheory(id) => {
        if self.store.get_theory(id).await?.is_none() {
          return Err(Error::TheoryNotFound(id));
        }
      }
    }

    self.store.insert_comment(input).await
  }

  /// Comments on a parent, oldest first. Counts are derived from this
  /// on read; nothing is cached for comments.
  pub async fn comments_for(
    &self,
    parent: CommentParent,
  ) -> Result<Vec<CommentView>> {
    self.store.comments_for(parent).await
  }

  /// Toggle the caller's upvote on a theory and return the post-toggle
  /// state. The vote-row mutation and the counter adjustment happen in
  /// one store-level unit of work; a partial application is a bug, not a
  /// degraded state.
  pub async fn toggle_vote(
    &self,
    user_id: Uuid,
    theory_id: i64,
  ) -> Result<VoteReceipt> {
    if self.store.get_theory(theory_id).await?.is_none() {
      return Err(Error::TheoryNotFound(theory_id));
    }
    self.store.toggle_vote(user_id, theory_id).await
  }

  /// Pure query, no side effect.
  pub async fn has_voted(&self, user_id: Uuid, theory_id: i64) -> Result<bool> {
    Ok(self.store.find_vote(user_id, theory_id).await?.is_some())
  }
}
