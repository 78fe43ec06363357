//! Error types for `siterank-core`.

use thiserror::Error;

use crate::ranking::ParameterKey;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown ranking parameter key: {0:?}")]
  UnknownParameterKey(String),

  #[error("no ranking parameter registered for factor {0}")]
  MissingWeight(ParameterKey),

  #[error("malformed staging line: {0:?}")]
  MalformedStagingLine(String),

  #[error("invalid reference dataset: {0}")]
  InvalidDataset(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// A required insertion field was missing. Nothing was written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("url is required")]
  MissingUrl,

  #[error("product name is required")]
  MissingProduct,

  #[error("at least one keyword is required")]
  MissingKeywords,

  #[error("seniority must be non-zero")]
  MissingSeniority,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
