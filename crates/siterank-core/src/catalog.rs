//! Catalog types: websites, products and the associations between them.
//!
//! Websites and associations are created by the insertion workflow and never
//! mutated afterwards. Products are reference data loaded by an external bulk
//! loader and are read-only to the engine.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Separator between tokens in a product's stored keyword string.
pub const KEYWORD_DELIMITER: char = ',';

// ─── Keywords ────────────────────────────────────────────────────────────────

/// A product's keyword string exactly as stored, e.g. `"tech,leisure time,"`.
///
/// Tokens are comma-terminated; a trailing delimiter is conventional but not
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords(String);

impl Keywords {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The set that submitted keywords must equal for an association to be
  /// created: trimmed, lowercased, split on the delimiter, with trailing
  /// empty tokens dropped.
  pub fn canonical_set(&self) -> BTreeSet<String> {
    self
      .0
      .trim()
      .trim_end_matches(KEYWORD_DELIMITER)
      .split(KEYWORD_DELIMITER)
      .map(|token| token.trim().to_lowercase())
      .collect()
  }

  /// Number of tokens fed into the `keywords` ranking factor.
  ///
  /// Interior empty tokens count; trailing delimiters do not.
  pub fn factor_count(&self) -> usize {
    self.0.trim_end_matches(KEYWORD_DELIMITER).split(KEYWORD_DELIMITER).count()
  }

  /// Whether `term` appears as a delimiter-terminated token. Comparison is
  /// case-sensitive; whitespace around each token is ignored.
  pub fn matches_term(&self, term: &str) -> bool {
    if term.is_empty() {
      return false;
    }
    let mut segments: Vec<&str> = self.0.split(KEYWORD_DELIMITER).collect();
    // The final segment has no terminating delimiter.
    segments.pop();
    segments.iter().any(|segment| segment.trim() == term)
  }
}

impl fmt::Display for Keywords {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Unique token ────────────────────────────────────────────────────────────

/// The opaque, globally unique handle of an association: the website URL
/// followed by `/` and a random URL-safe suffix.
///
/// Callers compare tokens for equality or check their URL prefix; they never
/// parse them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueToken(String);

impl UniqueToken {
  pub fn from_parts(url: &str, suffix: &str) -> Self { Self(format!("{url}/{suffix}")) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }
}

impl From<String> for UniqueToken {
  fn from(raw: String) -> Self { Self(raw) }
}

impl fmt::Display for UniqueToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Website {
  pub website_id: i64,
  pub url:        String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub product_id: i64,
  pub name:       String,
  pub keywords:   Keywords,
}

/// The link between one website and one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
  pub association_id:  i64,
  pub website_id:      i64,
  pub product_id:      i64,
  pub reference_count: i64,
  pub unique_token:    UniqueToken,
}

/// Input for [`CatalogStore::add_association`](crate::store::CatalogStore::add_association).
#[derive(Debug, Clone)]
pub struct NewAssociation {
  pub website_id:      i64,
  pub product_id:      i64,
  pub reference_count: i64,
  pub unique_token:    UniqueToken,
}

/// What the ranking job needs to know about an association besides its
/// staging entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationProfile {
  pub association_id:  i64,
  pub reference_count: i64,
  pub keywords:        Keywords,
}

// ─── Insertion candidate ─────────────────────────────────────────────────────

/// A website submitted for cataloguing against a named product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
  pub url:             String,
  pub product:         String,
  /// Only the values matter; keys are caller-chosen labels.
  pub keywords:        std::collections::BTreeMap<String, String>,
  /// Age of the website in days.
  pub seniority:       i64,
  #[serde(default)]
  pub reference_count: i64,
}

impl NewListing {
  pub fn new<K, V>(
    url: impl Into<String>,
    product: impl Into<String>,
    keywords: impl IntoIterator<Item = (K, V)>,
    seniority: i64,
  ) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      url: url.into(),
      product: product.into(),
      keywords: keywords
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
      seniority,
      reference_count: 0,
    }
  }

  pub fn with_references(mut self, reference_count: i64) -> Self {
    self.reference_count = reference_count;
    self
  }

  /// Reject listings with a missing required field.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.url.is_empty() {
      return Err(ValidationError::MissingUrl);
    }
    if self.product.is_empty() {
      return Err(ValidationError::MissingProduct);
    }
    if self.keywords.is_empty() {
      return Err(ValidationError::MissingKeywords);
    }
    if self.seniority == 0 {
      return Err(ValidationError::MissingSeniority);
    }
    Ok(())
  }

  /// Lowercased keyword values, duplicates collapsed.
  pub fn keyword_set(&self) -> BTreeSet<String> {
    self.keywords.values().map(|v| v.to_lowercase()).collect()
  }

  /// Whether the submitted keywords match `product`'s registered keywords.
  pub fn matches_product(&self, product: &Product) -> bool {
    self.keyword_set() == product.keywords.canonical_set()
  }
}
