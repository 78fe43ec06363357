//! SQL schema for the siterank SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS websites (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    url         TEXT NOT NULL,
    created_at  TEXT NOT NULL   -- ISO 8601 UTC; server-assigned
);

-- Reference data, bulk loaded.
CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    keywords    TEXT NOT NULL DEFAULT ''   -- comma-terminated tokens
);

CREATE TABLE IF NOT EXISTS associations (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    website_id       INTEGER NOT NULL REFERENCES websites(id),
    product_id       INTEGER NOT NULL REFERENCES products(id),
    reference_count  INTEGER NOT NULL DEFAULT 0,
    unique_token     TEXT NOT NULL,
    UNIQUE (unique_token)
);

-- Reference data, bulk loaded.
CREATE TABLE IF NOT EXISTS ranking_parameters (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    key       TEXT NOT NULL,       -- 'seniority' | 'ref' | 'keywords'
    priority  INTEGER NOT NULL,
    grade     REAL NOT NULL
);

-- Append-only; a job rerun adds rows instead of replacing them.
CREATE TABLE IF NOT EXISTS ranking_scores (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    association_id  INTEGER NOT NULL REFERENCES associations(id),
    parameter_id    INTEGER NOT NULL REFERENCES ranking_parameters(id),
    value           REAL NOT NULL,
    grade           REAL NOT NULL,
    run_id          TEXT NOT NULL,
    recorded_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS products_name_idx          ON products(name);
CREATE INDEX IF NOT EXISTS associations_product_idx   ON associations(product_id);
CREATE INDEX IF NOT EXISTS ranking_scores_assoc_idx   ON ranking_scores(association_id);

PRAGMA user_version = 1;
";

/// The tables owned by the store.
///
/// Declaration order puts referencing tables before the tables they
/// reference, which is the order truncation must follow.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  RankingScores,
  Associations,
  Websites,
  Products,
  RankingParameters,
}

impl Table {
  /// Columns a bulk load may name. Primary keys are included so reference
  /// data can pin its ids.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Table::RankingScores => &[
        "id",
        "association_id",
        "parameter_id",
        "value",
        "grade",
        "run_id",
        "recorded_at",
      ],
      Table::Associations => {
        &["id", "website_id", "product_id", "reference_count", "unique_token"]
      }
      Table::Websites => &["id", "url", "created_at"],
      Table::Products => &["id", "name", "keywords"],
      Table::RankingParameters => &["id", "key", "priority", "grade"],
    }
  }
}
