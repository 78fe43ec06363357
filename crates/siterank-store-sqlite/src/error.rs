//! Error type for `siterank-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] siterank_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("unknown column {column:?} for table {table}")]
  UnknownColumn { table: String, column: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
