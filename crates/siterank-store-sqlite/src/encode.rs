//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Everything else maps onto native SQLite types.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::Value as JsonValue;
use siterank_core::ranking::{ParameterKey, RankingParameter, RankingScore};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Reference dataset values ────────────────────────────────────────────────

/// Map a JSON dataset cell onto an SQLite value. Nested arrays and objects are
/// stored as their JSON text.
pub fn encode_json_value(value: &JsonValue) -> SqlValue {
  match value {
    JsonValue::Null => SqlValue::Null,
    JsonValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
    JsonValue::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    },
    JsonValue::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `ranking_parameters` row.
pub struct RawParameter {
  pub id:       i64,
  pub key:      String,
  pub priority: i64,
  pub grade:    f64,
}

impl RawParameter {
  pub fn into_parameter(self) -> Result<RankingParameter> {
    Ok(RankingParameter {
      parameter_id: self.id,
      key:          ParameterKey::parse(&self.key)?,
      priority:     self.priority,
      grade:        self.grade,
    })
  }
}

/// Raw values read directly from a `ranking_scores` row.
pub struct RawScore {
  pub id:             i64,
  pub association_id: i64,
  pub parameter_id:   i64,
  pub value:          f64,
  pub grade:          f64,
  pub run_id:         String,
  pub recorded_at:    String,
}

impl RawScore {
  pub fn into_score(self) -> Result<RankingScore> {
    Ok(RankingScore {
      score_id:       self.id,
      association_id: self.association_id,
      parameter_id:   self.parameter_id,
      value:          self.value,
      grade:          self.grade,
      run_id:         decode_uuid(&self.run_id)?,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn json_cells_map_to_sqlite_types() {
    assert_eq!(encode_json_value(&json!(null)), SqlValue::Null);
    assert_eq!(encode_json_value(&json!(true)), SqlValue::Integer(1));
    assert_eq!(encode_json_value(&json!(7)), SqlValue::Integer(7));
    assert_eq!(encode_json_value(&json!(2.5)), SqlValue::Real(2.5));
    assert_eq!(encode_json_value(&json!("tech,")), SqlValue::Text("tech,".into()));
    assert_eq!(encode_json_value(&json!(["a"])), SqlValue::Text("[\"a\"]".into()));
  }

  #[test]
  fn timestamps_roundtrip() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
