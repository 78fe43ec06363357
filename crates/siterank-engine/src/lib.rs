//! The siterank ranking and retrieval engine.
//!
//! [`Engine`] drives one [`CatalogStore`] backend and one [`StagingLog`]
//! through the three operations of the system:
//!
//! - [`Engine::insert_association`] validates a listing, records it and stages
//!   it for scoring,
//! - [`Engine::run_ranking_job`] drains the staging log into score rows,
//! - [`Engine::search`] returns the top options for a search term.
//!
//! Execution assumes a single logical writer: nothing here locks the staging
//! log or serialises concurrent callers.

pub mod error;
pub mod insertion;
pub mod job;
pub mod retrieval;
pub mod staging;
mod token;

use std::sync::Arc;

use siterank_core::store::CatalogStore;

pub use error::{Error, Result};
pub use insertion::{Insertion, Unassociated};
pub use job::JobReport;
pub use staging::StagingLog;

pub struct Engine<S> {
  store:   Arc<S>,
  staging: StagingLog,
}

impl<S: CatalogStore> Engine<S> {
  pub fn new(store: Arc<S>, staging: StagingLog) -> Self { Self { store, staging } }

  pub fn store(&self) -> &S { &self.store }

  pub fn staging(&self) -> &StagingLog { &self.staging }
}

#[cfg(test)]
mod tests;
