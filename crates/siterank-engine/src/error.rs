//! Engine error type.

use siterank_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid listing: {0}")]
  Validation(#[from] ValidationError),

  #[error("staging log error: {0}")]
  Staging(#[from] std::io::Error),

  #[error("core error: {0}")]
  Core(#[from] siterank_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
