//! Ranking parameters, staging entries and per-factor scoring.
//!
//! Scoring is a pure function of a [`WeightTable`], one [`StagingEntry`] and
//! the staged association's [`AssociationProfile`]. Each staged association
//! yields exactly three score rows, one per factor.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, catalog::AssociationProfile};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// The ranking factors. The string forms are the `key` column values of the
/// `ranking_parameters` table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterKey {
  /// Age of the website in days.
  Seniority,
  /// Number of references to the website.
  Ref,
  /// Number of keywords registered for the product.
  Keywords,
}

impl ParameterKey {
  pub fn parse(raw: &str) -> Result<Self> {
    Self::from_str(raw).map_err(|_| Error::UnknownParameterKey(raw.to_owned()))
  }
}

/// A row of the `ranking_parameters` reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingParameter {
  pub parameter_id: i64,
  pub key:          ParameterKey,
  pub priority:     i64,
  pub grade:        f64,
}

/// The weight of one factor, as loaded for a single job run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
  pub parameter_id: i64,
  pub priority:     i64,
  pub grade:        f64,
}

/// Immutable per-run view of the ranking parameters, keyed by factor.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
  seniority: Weight,
  reference: Weight,
  keywords:  Weight,
}

impl WeightTable {
  /// Build the table from parameter rows. When a key appears more than once
  /// the last row wins; every factor must be present.
  pub fn from_parameters(
    parameters: impl IntoIterator<Item = RankingParameter>,
  ) -> Result<Self> {
    let (mut seniority, mut reference, mut keywords) = (None, None, None);
    for p in parameters {
      let weight = Weight {
        parameter_id: p.parameter_id,
        priority:     p.priority,
        grade:        p.grade,
      };
      match p.key {
        ParameterKey::Seniority => seniority = Some(weight),
        ParameterKey::Ref => reference = Some(weight),
        ParameterKey::Keywords => keywords = Some(weight),
      }
    }
    Ok(Self {
      seniority: seniority.ok_or(Error::MissingWeight(ParameterKey::Seniority))?,
      reference: reference.ok_or(Error::MissingWeight(ParameterKey::Ref))?,
      keywords:  keywords.ok_or(Error::MissingWeight(ParameterKey::Keywords))?,
    })
  }

  pub fn get(&self, key: ParameterKey) -> &Weight {
    match key {
      ParameterKey::Seniority => &self.seniority,
      ParameterKey::Ref => &self.reference,
      ParameterKey::Keywords => &self.keywords,
    }
  }

  /// Score one staged association: seniority, ref and keywords, in that
  /// order.
  pub fn score_entry(
    &self,
    entry: &StagingEntry,
    profile: &AssociationProfile,
    run_id: Uuid,
  ) -> [NewScore; 3] {
    let score = |key: ParameterKey, magnitude: i64| {
      let weight = self.get(key);
      NewScore {
        association_id: entry.association_id,
        parameter_id:   weight.parameter_id,
        value:          weight.grade * magnitude as f64,
        grade:          weight.grade,
        run_id,
      }
    };
    [
      score(ParameterKey::Seniority, entry.seniority),
      score(ParameterKey::Ref, profile.reference_count),
      score(ParameterKey::Keywords, profile.keywords.factor_count() as i64),
    ]
  }
}

// ─── Scores ──────────────────────────────────────────────────────────────────

/// Input for [`CatalogStore::record_score`](crate::store::CatalogStore::record_score).
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
  pub association_id: i64,
  pub parameter_id:   i64,
  pub value:          f64,
  pub grade:          f64,
  /// The job run that produced this row.
  pub run_id:         Uuid,
}

/// A persisted score row. Rows are append-only; a rerun of the job over the
/// same staging entries adds new rows rather than replacing old ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingScore {
  pub score_id:       i64,
  pub association_id: i64,
  pub parameter_id:   i64,
  pub value:          f64,
  pub grade:          f64,
  pub run_id:         Uuid,
  pub recorded_at:    DateTime<Utc>,
}

// ─── Staging ─────────────────────────────────────────────────────────────────

/// One pending association awaiting score computation.
///
/// Serialised as a single `"<association_id> <seniority>"` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingEntry {
  pub association_id: i64,
  pub seniority:      i64,
}

impl StagingEntry {
  pub fn to_line(&self) -> String {
    format!("{} {}\n", self.association_id, self.seniority)
  }
}

impl FromStr for StagingEntry {
  type Err = Error;

  fn from_str(line: &str) -> Result<Self> {
    let malformed = || Error::MalformedStagingLine(line.to_owned());
    let mut fields = line.split_whitespace();
    let (Some(id), Some(seniority), None) =
      (fields.next(), fields.next(), fields.next())
    else {
      return Err(malformed());
    };
    Ok(Self {
      association_id: id.parse().map_err(|_| malformed())?,
      seniority:      seniority.parse().map_err(|_| malformed())?,
    })
  }
}
