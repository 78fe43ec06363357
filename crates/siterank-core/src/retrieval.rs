//! Top-K retrieval ordering.
//!
//! Backends aggregate score rows per association into a [`RankedListing`];
//! [`select_top`] applies the keyword filter and the ordering rule:
//!
//! 1. `sum_value` descending,
//! 2. `tiebreak_key` (`max(grade * TIEBREAK_SCALE + value)`) descending,
//! 3. `association_id` ascending.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{Keywords, UniqueToken};

/// Multiplier that lets a factor's grade dominate its value in the tie-break
/// key, provided values stay below it.
pub const TIEBREAK_SCALE: f64 = 10_000_000.0;

/// Number of options returned by a search.
pub const TOP_K: usize = 3;

pub fn tiebreak_key(grade: f64, value: f64) -> f64 { grade * TIEBREAK_SCALE + value }

/// An association with its aggregated scores, as produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
  pub association_id: i64,
  pub url:            String,
  pub unique_token:   UniqueToken,
  pub keywords:       Keywords,
  /// Sum of `value` over every score row of the association.
  pub sum_value:      f64,
  /// Maximum of [`tiebreak_key`] over every score row of the association.
  pub tiebreak_key:   f64,
}

/// One entry of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOption {
  /// 1-based position in the result.
  pub rank_position:    usize,
  /// `"option<rank_position>"`.
  pub option_value:     String,
  pub product_page_url: String,
  pub unique_token:     UniqueToken,
}

pub fn compare(a: &RankedListing, b: &RankedListing) -> Ordering {
  b.sum_value
    .total_cmp(&a.sum_value)
    .then_with(|| b.tiebreak_key.total_cmp(&a.tiebreak_key))
    .then_with(|| a.association_id.cmp(&b.association_id))
}

/// Keep listings whose product carries `term` as a keyword, order them and
/// return at most `limit` options.
pub fn select_top(
  mut listings: Vec<RankedListing>,
  term: &str,
  limit: usize,
) -> Vec<SearchOption> {
  listings.retain(|l| l.keywords.matches_term(term));
  listings.sort_by(compare);
  listings
    .into_iter()
    .take(limit)
    .enumerate()
    .map(|(idx, l)| {
      let rank_position = idx + 1;
      SearchOption {
        rank_position,
        option_value: format!("option{rank_position}"),
        product_page_url: l.url,
        unique_token: l.unique_token,
      }
    })
    .collect()
}
