//! JSON REST API for Fanon.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fanon_core::store::ContentStore`]. Authentication happens upstream:
//! an identity-aware proxy sets the `x-user-id` header and this layer
//! trusts it. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fanon_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod characters;
pub mod error;
pub mod lore;
pub mod profiles;
pub mod relationships;
pub mod series;
pub mod theories;
pub mod timelines;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use fanon_core::{
  assoc::AssociationIndex, catalog::Catalog, engage::EngagementAggregator,
  graph::RelationshipGraph, store::ContentStore,
};

pub use error::ApiError;

/// Shared handler state: the store plus the service components built
/// over it.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:   S,
  pub graph:   RelationshipGraph<S>,
  pub assoc:   AssociationIndex<S>,
  pub engage:  EngagementAggregator<S>,
  pub catalog: Catalog<S>,
}

impl<S: ContentStore + Clone> AppState<S> {
  pub fn new(store: S) -> Self {
    Self {
      graph:   RelationshipGraph::new(store.clone()),
      assoc:   AssociationIndex::new(store.clone()),
      engage:  EngagementAggregator::new(store.clone()),
      catalog: Catalog::new(store.clone()),
      store,
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: S) -> Router<()>
where
  S: ContentStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Profiles
    .route("/profile", put(profiles::upsert_self::<S>))
    .route("/profiles/{id}", get(profiles::get_one::<S>))
    // Series
    .route("/series", get(series::list::<S>).post(series::create::<S>))
    // Characters
    .route(
      "/characters",
      get(characters::list::<S>).post(characters::create::<S>),
    )
    .route("/characters/{id}", get(characters::get_one::<S>))
    // Relationship edges
    .route("/relationships", post(relationships::create::<S>))
    .route("/relationships/{id}", delete(relationships::delete_one::<S>))
    // Lore entries
    .route("/lore", get(lore::list::<S>).post(lore::create::<S>))
    .route("/lore/{id}", get(lore::get_one::<S>))
    .route("/lore/{id}/characters", post(lore::link_character::<S>))
    .route("/lore/{id}/comments", post(lore::comment::<S>))
    // Fan theories
    .route("/theories", get(theories::list::<S>).post(theories::create::<S>))
    .route("/theories/{id}", get(theories::get_one::<S>))
    .route(
      "/theories/{id}/vote",
      get(theories::vote_state::<S>).post(theories::vote::<S>),
    )
    .route("/theories/{id}/comments", post(theories::comment::<S>))
    // Timelines
    .route(
      "/timelines",
      get(timelines::list::<S>).post(timelines::create::<S>),
    )
    .route(
      "/timelines/{id}/events",
      get(timelines::events::<S>).post(timelines::add_event::<S>),
    )
    .with_state(AppState::new(store))
}
