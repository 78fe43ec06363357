//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `siterank-store-sqlite`).
//! The engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  catalog::{Association, AssociationProfile, NewAssociation, Product, Website},
  ranking::{NewScore, RankingParameter, RankingScore},
  retrieval::RankedListing,
};

/// Abstraction over a siterank catalog backend.
///
/// Websites, associations and score rows are append-only. Products and
/// ranking parameters are reference data and are only read here.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Catalog writes ────────────────────────────────────────────────────

  /// Persist a new website row. The `created_at` timestamp is set by the
  /// store.
  fn add_website(
    &self,
    url: String,
  ) -> impl Future<Output = Result<Website, Self::Error>> + Send + '_;

  /// Persist a new association and return it with its assigned id.
  fn add_association(
    &self,
    input: NewAssociation,
  ) -> impl Future<Output = Result<Association, Self::Error>> + Send + '_;

  // ── Catalog reads ─────────────────────────────────────────────────────

  /// Look up a product by exact name. Returns `None` if not found.
  fn find_product(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// Resolve an association to its reference count and its product's
  /// keywords. Returns `None` if the association no longer exists.
  fn association_profile(
    &self,
    association_id: i64,
  ) -> impl Future<Output = Result<Option<AssociationProfile>, Self::Error>> + Send + '_;

  // ── Ranking ───────────────────────────────────────────────────────────

  /// All rows of the ranking parameter reference table.
  fn ranking_parameters(
    &self,
  ) -> impl Future<Output = Result<Vec<RankingParameter>, Self::Error>> + Send + '_;

  /// Append a score row. The `recorded_at` timestamp is set by the store.
  fn record_score(
    &self,
    input: NewScore,
  ) -> impl Future<Output = Result<RankingScore, Self::Error>> + Send + '_;

  /// Every score row recorded for an association, oldest first.
  fn scores_for(
    &self,
    association_id: i64,
  ) -> impl Future<Output = Result<Vec<RankingScore>, Self::Error>> + Send + '_;

  /// Associations that have at least one score row and whose product's
  /// keywords may contain `term`, with their scores aggregated.
  ///
  /// Backends may over-approximate the keyword filter; the exact rule is
  /// applied by [`select_top`](crate::retrieval::select_top).
  fn ranked_listings(
    &self,
    term: String,
  ) -> impl Future<Output = Result<Vec<RankedListing>, Self::Error>> + Send + '_;
}
