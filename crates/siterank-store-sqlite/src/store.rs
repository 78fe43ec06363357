//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use siterank_core::{
  catalog::{
    Association, AssociationProfile, Keywords, NewAssociation, Product, Website,
  },
  ranking::{NewScore, RankingParameter, RankingScore},
  retrieval::{RankedListing, TIEBREAK_SCALE},
  store::CatalogStore,
};

use crate::{
  Result,
  encode::{RawParameter, RawScore, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A siterank catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = crate::Error;

  // ── Catalog writes ────────────────────────────────────────────────────────

  async fn add_website(&self, url: String) -> Result<Website> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let url_param  = url.clone();

    let website_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO websites (url, created_at) VALUES (?1, ?2)",
          rusqlite::params![url_param, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(website_id, %url, "website recorded");
    Ok(Website { website_id, url, created_at })
  }

  async fn add_association(&self, input: NewAssociation) -> Result<Association> {
    let token_str = input.unique_token.as_str().to_owned();

    let association_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO associations (website_id, product_id, reference_count, unique_token)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.website_id,
            input.product_id,
            input.reference_count,
            token_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Association {
      association_id,
      website_id:      input.website_id,
      product_id:      input.product_id,
      reference_count: input.reference_count,
      unique_token:    input.unique_token,
    })
  }

  // ── Catalog reads ─────────────────────────────────────────────────────────

  async fn find_product(&self, name: String) -> Result<Option<Product>> {
    let product = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, name, keywords FROM products WHERE name = ?1
             ORDER BY id LIMIT 1",
            rusqlite::params![name],
            |row| {
              Ok(Product {
                product_id: row.get(0)?,
                name:       row.get(1)?,
                keywords:   Keywords::new(row.get::<_, String>(2)?),
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(product)
  }

  async fn association_profile(
    &self,
    association_id: i64,
  ) -> Result<Option<AssociationProfile>> {
    let profile = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT a.id, a.reference_count, p.keywords
             FROM associations a
             JOIN products p ON p.id = a.product_id
             WHERE a.id = ?1",
            rusqlite::params![association_id],
            |row| {
              Ok(AssociationProfile {
                association_id:  row.get(0)?,
                reference_count: row.get(1)?,
                keywords:        Keywords::new(row.get::<_, String>(2)?),
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(profile)
  }

  // ── Ranking ───────────────────────────────────────────────────────────────

  async fn ranking_parameters(&self) -> Result<Vec<RankingParameter>> {
    let raws: Vec<RawParameter> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, key, priority, grade FROM ranking_parameters ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawParameter {
              id:       row.get(0)?,
              key:      row.get(1)?,
              priority: row.get(2)?,
              grade:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParameter::into_parameter).collect()
  }

  async fn record_score(&self, input: NewScore) -> Result<RankingScore> {
    let recorded_at = Utc::now();
    let at_str      = encode_dt(recorded_at);
    let run_id_str  = encode_uuid(input.run_id);

    let score_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ranking_scores (
             association_id, parameter_id, value, grade, run_id, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.association_id,
            input.parameter_id,
            input.value,
            input.grade,
            run_id_str,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(RankingScore {
      score_id,
      association_id: input.association_id,
      parameter_id: input.parameter_id,
      value: input.value,
      grade: input.grade,
      run_id: input.run_id,
      recorded_at,
    })
  }

  async fn scores_for(&self, association_id: i64) -> Result<Vec<RankingScore>> {
    let raws: Vec<RawScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, association_id, parameter_id, value, grade, run_id, recorded_at
           FROM ranking_scores
           WHERE association_id = ?1
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![association_id], |row| {
            Ok(RawScore {
              id:             row.get(0)?,
              association_id: row.get(1)?,
              parameter_id:   row.get(2)?,
              value:          row.get(3)?,
              grade:          row.get(4)?,
              run_id:         row.get(5)?,
              recorded_at:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScore::into_score).collect()
  }

  async fn ranked_listings(&self, term: String) -> Result<Vec<RankedListing>> {
    // `instr` is a case-sensitive substring test; the exact token rule is
    // applied by `select_top`.
    let listings = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.id, w.url, a.unique_token, p.keywords,
                  r.sum_value, r.tiebreak_key
           FROM websites w
           JOIN associations a ON a.website_id = w.id
           JOIN products     p ON p.id = a.product_id
           JOIN (
             SELECT association_id,
                    SUM(value)              AS sum_value,
                    MAX(grade * ?2 + value) AS tiebreak_key
             FROM ranking_scores
             GROUP BY association_id
           ) r ON r.association_id = a.id
           WHERE instr(p.keywords, ?1) > 0
           ORDER BY r.sum_value DESC, r.tiebreak_key DESC, a.id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![term, TIEBREAK_SCALE], |row| {
            Ok(RankedListing {
              association_id: row.get(0)?,
              url:            row.get(1)?,
              unique_token:   row.get::<_, String>(2)?.into(),
              keywords:       Keywords::new(row.get::<_, String>(3)?),
              sum_value:      row.get(4)?,
              tiebreak_key:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(listings)
  }
}
