//! Reference datasets for bulk loading.
//!
//! A dataset is a JSON object mapping table names to their column list and
//! rows:
//!
//! ```json
//! {
//!   "ranking_parameters": {
//!     "columns": "key, priority, grade",
//!     "data": [["seniority", 1, 3.0], ["ref", 2, 2.0], ["keywords", 3, 1.0]]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
  /// Comma-joined column names.
  pub columns: String,
  pub data:    Vec<Vec<Value>>,
}

impl ReferenceTable {
  pub fn column_names(&self) -> Vec<&str> {
    self
      .columns
      .split(',')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .collect()
  }

  /// Check that every row has one value per column.
  pub fn validate(&self, table: &str) -> Result<()> {
    let width = self.column_names().len();
    if width == 0 {
      return Err(Error::InvalidDataset(format!("{table}: no columns")));
    }
    if let Some((idx, row)) =
      self.data.iter().enumerate().find(|(_, row)| row.len() != width)
    {
      return Err(Error::InvalidDataset(format!(
        "{table}: row {idx} has {} values, expected {width}",
        row.len()
      )));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceDataset(BTreeMap<String, ReferenceTable>);

impl ReferenceDataset {
  pub fn from_json(raw: &str) -> Result<Self> {
    let dataset: Self = serde_json::from_str(raw)?;
    for (name, table) in &dataset.0 {
      table.validate(name)?;
    }
    Ok(dataset)
  }

  pub fn insert(&mut self, name: impl Into<String>, table: ReferenceTable) {
    self.0.insert(name.into(), table);
  }

  pub fn get(&self, name: &str) -> Option<&ReferenceTable> { self.0.get(name) }

  pub fn tables(&self) -> impl Iterator<Item = (&str, &ReferenceTable)> {
    self.0.iter().map(|(name, table)| (name.as_str(), table))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_tables_and_columns() {
    let dataset = ReferenceDataset::from_json(
      r#"{"products": {"columns": "name, keywords", "data": [["tv", "tech,"]]}}"#,
    )
    .unwrap();
    let products = dataset.get("products").unwrap();
    assert_eq!(products.column_names(), ["name", "keywords"]);
    assert_eq!(products.data.len(), 1);
  }

  #[test]
  fn rejects_ragged_rows() {
    let err = ReferenceDataset::from_json(
      r#"{"products": {"columns": "name, keywords", "data": [["tv"]]}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidDataset(msg) if msg.contains("row 0")));
  }
}
