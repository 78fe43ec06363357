//! Administrative operations outside the [`CatalogStore`] contract:
//! reference data loading, table counting and truncation.
//!
//! [`CatalogStore`]: siterank_core::store::CatalogStore

use std::str::FromStr;

use rusqlite::types::Value as SqlValue;
use siterank_core::dataset::{ReferenceDataset, ReferenceTable};

use crate::{Error, Result, SqliteStore, encode::encode_json_value, schema::Table};

impl SqliteStore {
  /// Load every table of `dataset` (or only `only`, when given) with one
  /// parameterised insert per row. Each table loads in its own transaction.
  ///
  /// Returns the number of rows inserted.
  pub async fn bulk_load(
    &self,
    dataset: &ReferenceDataset,
    only: Option<Table>,
  ) -> Result<usize> {
    let mut inserted = 0;
    for (name, table) in dataset.tables() {
      let target = Table::from_str(name)
        .map_err(|_| Error::UnknownTable(name.to_owned()))?;
      if only.is_some_and(|t| t != target) {
        continue;
      }
      inserted += self.load_table(target, table).await?;
    }
    Ok(inserted)
  }

  async fn load_table(&self, target: Table, table: &ReferenceTable) -> Result<usize> {
    table.validate(target.as_ref())?;

    let columns = table.column_names();
    if let Some(unknown) = columns
      .iter()
      .find(|c| !target.columns().iter().any(|known| *known == **c))
    {
      return Err(Error::UnknownColumn {
        table:  target.to_string(),
        column: (*unknown).to_owned(),
      });
    }

    let placeholders = (1..=columns.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "INSERT INTO {target} ({}) VALUES ({placeholders})",
      columns.join(", ")
    );
    let rows: Vec<Vec<SqlValue>> = table
      .data
      .iter()
      .map(|row| row.iter().map(encode_json_value).collect())
      .collect();

    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(&sql)?;
          for row in &rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::info!(table = %target, rows = count, "reference data loaded");
    Ok(count)
  }

  /// Number of user tables in the database.
  pub async fn count_tables(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT count(*) FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
          [],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as usize)
  }

  /// Number of rows currently in `table`.
  pub async fn count_rows(&self, table: Table) -> Result<usize> {
    let sql = format!("SELECT count(*) FROM {table}");
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(count as usize)
  }

  /// Delete every row of `tables`, referencing tables first, in a single
  /// transaction. Returns the number of rows deleted.
  pub async fn truncate(&self, tables: &[Table]) -> Result<usize> {
    let mut ordered = tables.to_vec();
    ordered.sort();
    ordered.dedup();

    let statements: Vec<String> =
      ordered.iter().map(|t| format!("DELETE FROM {t}")).collect();

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut deleted = 0;
        for sql in &statements {
          deleted += tx.execute(sql, [])?;
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    tracing::info!(tables = ?ordered, rows = deleted, "tables truncated");
    Ok(deleted)
  }
}
