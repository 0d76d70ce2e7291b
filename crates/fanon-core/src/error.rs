//! Error types for `fanon-core`.

use thiserror::Error;
use uuid::Uuid;

/// The four failure classes callers are expected to distinguish.
///
/// Transport layers map these onto their own vocabulary (HTTP status
/// codes); individual [`Error`] variants stay precise for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or semantically invalid input.
  Validation,
  /// A referenced id did not resolve.
  NotFound,
  /// A would-be duplicate where uniqueness is a real invariant.
  Conflict,
  /// Underlying persistence failure, opaque to callers.
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("a relationship cannot link a character to itself")]
  SelfRelationship,

  #[error("comment content is empty")]
  EmptyComment,

  #[error("a comment must reference exactly one of a lore entry or a theory")]
  AmbiguousCommentParent,

  #[error("unknown lore tag: {0:?}")]
  UnknownTag(String),

  #[error("character not found: {0}")]
  CharacterNotFound(i64),

  #[error("series not found: {0}")]
  SeriesNotFound(i64),

  #[error("lore entry not found: {0}")]
  LoreEntryNotFound(i64),

  #[error("theory not found: {0}")]
  TheoryNotFound(i64),

  #[error("relationship not found: {0}")]
  RelationshipNotFound(i64),

  #[error("timeline not found: {0}")]
  TimelineNotFound(i64),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error(
    "characters {0} and {1} already have a {2:?} relationship"
  )]
  DuplicateRelationship(i64, i64, String),

  #[error("duplicate vote for theory {theory_id} by user {user_id}")]
  DuplicateVote { user_id: Uuid, theory_id: i64 },

  #[error("stored data is corrupt: {0}")]
  Corrupt(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
  /// Wrap an arbitrary backend failure as the opaque store class.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::SelfRelationship
      | Self::EmptyComment
      | Self::AmbiguousCommentParent
      | Self::UnknownTag(_) => ErrorKind::Validation,

      Self::CharacterNotFound(_)
      | Self::SeriesNotFound(_)
      | Self::LoreEntryNotFound(_)
      | Self::TheoryNotFound(_)
      | Self::RelationshipNotFound(_)
      | Self::TimelineNotFound(_)
      | Self::ProfileNotFound(_) => ErrorKind::NotFound,

      Self::DuplicateRelationship(..) | Self::DuplicateVote { .. } => {
        ErrorKind::Conflict
      }

      Self::Corrupt(_) | Self::Store(_) => ErrorKind::Store,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
