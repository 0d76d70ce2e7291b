//! Core types and trait definitions for the Fanon content service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assoc;
pub mod catalog;
pub mod character;
pub mod comment;
pub mod engage;
pub mod error;
pub mod graph;
pub mod lore;
pub mod profile;
pub mod relationship;
pub mod series;
pub mod store;
pub mod theory;
pub mod timeline;

pub use error::{Error, ErrorKind, Result};
